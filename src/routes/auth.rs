use axum::{
    extract::State,
    http::HeaderMap,
    Json,
};
use chrono::Utc;
use once_cell::sync::Lazy;
use regex::Regex;
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::{hash_password, issue_session, new_salt, Role};
use crate::entities::user;
use crate::error::AppError;
use crate::AppState;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap());

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    /// founder | investor
    pub role: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SessionResponse {
    pub token: String,
    pub user_id: Uuid,
    pub role: String,
    pub full_name: String,
}

/// The public anon key must accompany every auth request; the service key
/// is accepted too so server-side tooling can drive these endpoints.
fn check_api_key(headers: &HeaderMap, state: &AppState) -> Result<(), AppError> {
    let key = headers
        .get("x-api-key")
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("missing x-api-key header".to_string()))?;
    if key != state.config.anon_api_key && key != state.config.service_api_key {
        return Err(AppError::Unauthorized("invalid API key".to_string()));
    }
    Ok(())
}

/// Register a founder or investor account and issue a session
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 200, description = "Account created, session issued", body = SessionResponse),
        (status = 401, description = "Missing or invalid API key"),
        (status = 409, description = "Email already registered"),
        (status = 422, description = "Invalid email, password or role")
    )
)]
#[tracing::instrument(skip(state, headers, body), fields(email = %body.email))]
pub async fn signup(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<SignupRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    check_api_key(&headers, &state)?;

    let email = body.email.trim().to_lowercase();
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::Validation(format!("invalid email: {}", email)));
    }
    if body.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".to_string(),
        ));
    }
    let role = Role::parse(&body.role)?;
    if role == Role::Admin {
        // Admin accounts are seeded out of band, never self-registered.
        return Err(AppError::Forbidden(
            "cannot self-register an admin account".to_string(),
        ));
    }

    let salt = new_salt();
    let user = user::ActiveModel {
        id: Set(Uuid::new_v4()),
        email: Set(email),
        password_hash: Set(hash_password(&salt, &body.password)),
        password_salt: Set(salt),
        full_name: Set(body.full_name.trim().to_string()),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now()),
    }
    // A duplicate email surfaces as a unique violation, mapped to 409.
    .insert(&state.db)
    .await?;

    let token = issue_session(&state.db, user.id, role).await?;
    tracing::info!(user_id = %user.id, role = role.as_str(), "new account registered");

    Ok(Json(SessionResponse {
        token,
        user_id: user.id,
        role: user.role,
        full_name: user.full_name,
    }))
}

/// Verify credentials and issue a fresh role-tagged session
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session issued", body = SessionResponse),
        (status = 401, description = "Bad credentials or missing API key")
    )
)]
#[tracing::instrument(skip(state, headers, body), fields(email = %body.email))]
pub async fn login(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<LoginRequest>,
) -> Result<Json<SessionResponse>, AppError> {
    check_api_key(&headers, &state)?;

    let email = body.email.trim().to_lowercase();
    let user = user::Entity::find()
        .filter(user::Column::Email.eq(&email))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::Unauthorized("bad credentials".to_string()))?;

    if hash_password(&user.password_salt, &body.password) != user.password_hash {
        return Err(AppError::Unauthorized("bad credentials".to_string()));
    }

    let role = Role::parse(&user.role)?;
    let token = issue_session(&state.db, user.id, role).await?;

    Ok(Json(SessionResponse {
        token,
        user_id: user.id,
        role: user.role,
        full_name: user.full_name,
    }))
}
