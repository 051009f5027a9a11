use axum::{extract::FromRequestParts, http::request::Parts};
use chrono::{Duration, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::entities::session;
use crate::error::AppError;
use crate::AppState;

const SESSION_TTL_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Founder,
    Investor,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Founder => "founder",
            Role::Investor => "investor",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Result<Self, AppError> {
        match s {
            "founder" => Ok(Role::Founder),
            "investor" => Ok(Role::Investor),
            "admin" => Ok(Role::Admin),
            other => Err(AppError::Validation(format!("unknown role: {}", other))),
        }
    }
}

/// Salted SHA-256 digest, hex encoded.
pub fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

pub fn new_salt() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Opaque bearer token; two v4 uuids of entropy.
pub fn new_session_token() -> String {
    format!(
        "{}{}",
        Uuid::new_v4().simple(),
        Uuid::new_v4().simple()
    )
}

/// Insert a session row for the user and return the bearer token.
pub async fn issue_session(
    db: &sea_orm::DatabaseConnection,
    user_id: Uuid,
    role: Role,
) -> Result<String, AppError> {
    let token = new_session_token();
    let now = Utc::now();
    session::ActiveModel {
        token: Set(token.clone()),
        user_id: Set(user_id),
        role: Set(role.as_str().to_string()),
        created_at: Set(now),
        expires_at: Set(now + Duration::days(SESSION_TTL_DAYS)),
    }
    .insert(db)
    .await?;
    Ok(token)
}

/// Authenticated principal resolved from the `Authorization` header.
///
/// The server-only service key acts as an admin principal with a nil user
/// id, so machine clients can reach the admin API without a session row.
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub id: Uuid,
    pub role: Role,
}

impl AuthUser {
    pub fn require_admin(&self) -> Result<(), AppError> {
        if self.role != Role::Admin {
            return Err(AppError::Forbidden("admin role required".to_string()));
        }
        Ok(())
    }

    pub fn require_role(&self, role: Role) -> Result<(), AppError> {
        if self.role != role && self.role != Role::Admin {
            return Err(AppError::Forbidden(format!(
                "{} role required",
                role.as_str()
            )));
        }
        Ok(())
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized("missing Authorization header".to_string()))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::Unauthorized("expected a bearer token".to_string()))?;

        if token == state.config.service_api_key {
            return Ok(AuthUser {
                id: Uuid::nil(),
                role: Role::Admin,
            });
        }

        let session = session::Entity::find()
            .filter(session::Column::Token.eq(token))
            .one(&state.db)
            .await?
            .ok_or_else(|| AppError::Unauthorized("invalid session token".to_string()))?;

        if session.expires_at < Utc::now() {
            return Err(AppError::Unauthorized("session expired".to_string()));
        }

        Ok(AuthUser {
            id: session.user_id,
            role: Role::parse(&session.role)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_is_salted() {
        let a = hash_password("salt-a", "hunter2");
        let b = hash_password("salt-b", "hunter2");
        assert_ne!(a, b);
        assert_eq!(a, hash_password("salt-a", "hunter2"));
    }

    #[test]
    fn role_round_trip() {
        for role in [Role::Founder, Role::Investor, Role::Admin] {
            assert_eq!(Role::parse(role.as_str()).unwrap(), role);
        }
        assert!(Role::parse("superuser").is_err());
    }
}
