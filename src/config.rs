use std::env;

use crate::error::AppError;

/// Runtime configuration sourced from environment variables.
///
/// `DATABASE_URL`, `ANON_API_KEY` and `SERVICE_API_KEY` are required and
/// their absence is an error at construction time. The anon key gates the
/// public auth endpoints; the service key acts as a server-only admin
/// credential and must never be handed to browsers.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub anon_api_key: String,
    pub service_api_key: String,
    pub bind_addr: String,
    pub upload_dir: String,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        Ok(Config {
            database_url: required("DATABASE_URL")?,
            anon_api_key: required("ANON_API_KEY")?,
            service_api_key: required("SERVICE_API_KEY")?,
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:3000".to_string()),
            upload_dir: env::var("UPLOAD_DIR").unwrap_or_else(|_| "./uploads".to_string()),
        })
    }
}

fn required(name: &str) -> Result<String, AppError> {
    env::var(name)
        .map_err(|_| AppError::Internal(format!("{} environment variable is not set", name)))
}
