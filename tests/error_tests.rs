use axum::{http::StatusCode, response::IntoResponse};
use dealflow::error::AppError;
use http_body_util::BodyExt;
use serde_json::Value;

// Test for AppError Display implementation
#[test]
fn test_app_error_display() {
    let error = AppError::Unauthorized("missing Authorization header".to_string());
    assert_eq!(
        error.to_string(),
        "Unauthorized: missing Authorization header"
    );

    let error = AppError::Forbidden("admin role required".to_string());
    assert_eq!(error.to_string(), "Forbidden: admin role required");

    let error = AppError::NotFound("company 42".to_string());
    assert_eq!(error.to_string(), "Not found: company 42");

    let error = AppError::Validation("company name is required".to_string());
    assert_eq!(error.to_string(), "Invalid request: company name is required");

    let error = AppError::Conflict("email already registered".to_string());
    assert_eq!(error.to_string(), "Conflict: email already registered");
}

// Test for AppError IntoResponse implementation
#[tokio::test]
async fn test_app_error_into_response() {
    let cases = [
        (
            AppError::Unauthorized("no session".to_string()),
            StatusCode::UNAUTHORIZED,
        ),
        (
            AppError::Forbidden("admin role required".to_string()),
            StatusCode::FORBIDDEN,
        ),
        (
            AppError::NotFound("firm xyz".to_string()),
            StatusCode::NOT_FOUND,
        ),
        (
            AppError::Validation("bad file".to_string()),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
        (
            AppError::Conflict("duplicate email".to_string()),
            StatusCode::CONFLICT,
        ),
        (
            AppError::Database("connection refused".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
        (
            AppError::Internal("boom".to_string()),
            StatusCode::INTERNAL_SERVER_ERROR,
        ),
    ];

    for (error, expected_status) in cases {
        let message = error.to_string();
        let response = error.into_response();
        assert_eq!(response.status(), expected_status);

        let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap();
        assert_eq!(body["error"], message);
    }
}

#[test]
fn test_io_error_maps_to_internal() {
    let io_error = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
    let error: AppError = io_error.into();
    assert!(matches!(error, AppError::Internal(_)));
}

#[tokio::test]
async fn test_record_not_found_maps_to_404() {
    let db_error = sea_orm::DbErr::RecordNotFound("investor profile".to_string());
    let error: AppError = db_error.into();
    let response = error.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
