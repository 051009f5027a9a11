use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use dealflow::{create_app, AppState, Config};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

const ANON_KEY: &str = "test-anon-key";
const SERVICE_KEY: &str = "test-service-key";

/// App over a disconnected database: good for everything that short
/// circuits before touching Postgres (auth guards, key checks, statics).
fn test_app() -> axum::Router {
    let state = AppState {
        db: DatabaseConnection::default(),
        config: Arc::new(Config {
            database_url: "postgres://unused".to_string(),
            anon_api_key: ANON_KEY.to_string(),
            service_api_key: SERVICE_KEY.to_string(),
            bind_addr: "127.0.0.1:0".to_string(),
            upload_dir: "./uploads".to_string(),
        }),
    };
    create_app(state)
}

fn request(method: &str, uri: &str) -> axum::http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        // The rate limiter keys on client IP
        .header("x-forwarded-for", "203.0.113.7")
}

#[tokio::test]
async fn test_health_check() {
    let app = test_app();

    let response = app
        .oneshot(request("GET", "/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = test_app();

    let response = app
        .oneshot(
            request("GET", "/not-a-real-route")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_admin_routes_reject_missing_bearer() {
    for uri in [
        "/api/admin/investors",
        "/api/admin/investors/stats",
        "/api/admin/founders",
        "/api/admin/firms",
        "/api/admin/import/template",
    ] {
        let app = test_app();
        let response = app
            .oneshot(request("GET", uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "uri: {}", uri);

        let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&body).unwrap();
        assert!(json["error"].as_str().unwrap().contains("Unauthorized"));
    }
}

#[tokio::test]
async fn test_gated_routes_reject_non_bearer_scheme() {
    let app = test_app();
    let response = app
        .oneshot(
            request("GET", "/api/company")
                .header("authorization", "Basic dXNlcjpwYXNz")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_requires_api_key() {
    let app = test_app();

    let body = serde_json::json!({
        "email": "founder@example.com",
        "password": "hunter2hunter2",
        "full_name": "Jane Founder",
        "role": "founder"
    });
    let response = app
        .oneshot(
            request("POST", "/auth/signup")
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_rejects_wrong_api_key() {
    let app = test_app();

    let body = serde_json::json!({
        "email": "founder@example.com",
        "password": "hunter2hunter2",
        "full_name": "Jane Founder",
        "role": "founder"
    });
    let response = app
        .oneshot(
            request("POST", "/auth/signup")
                .header("content-type", "application/json")
                .header("x-api-key", "not-the-key")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_service_key_acts_as_admin_for_enrichment() {
    let app = test_app();

    let body = serde_json::json!({ "ids": [] });
    let response = app
        .oneshot(
            request("POST", "/api/admin/investors/enrich")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", SERVICE_KEY))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json: Value = serde_json::from_slice(&body).unwrap();
    assert!(json["job_id"].is_string());
    assert_eq!(json["requested"], 0);
    assert_eq!(json["status"], "queued");
}

#[tokio::test]
async fn test_enrichment_job_ids_are_unique_per_call() {
    let body = serde_json::json!({ "ids": [] }).to_string();

    let mut job_ids = Vec::new();
    for _ in 0..2 {
        let app = test_app();
        let response = app
            .oneshot(
                request("POST", "/api/admin/investors/enrich")
                    .header("content-type", "application/json")
                    .header("authorization", format!("Bearer {}", SERVICE_KEY))
                    .body(Body::from(body.clone()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
        let json: Value = serde_json::from_slice(&bytes).unwrap();
        job_ids.push(json["job_id"].as_str().unwrap().to_string());
    }
    assert_ne!(job_ids[0], job_ids[1]);
}

#[tokio::test]
async fn test_bulk_delete_with_no_ids_is_a_noop() {
    let app = test_app();

    let body = serde_json::json!({ "ids": [] });
    let response = app
        .oneshot(
            request("POST", "/api/admin/investors/bulk-delete")
                .header("content-type", "application/json")
                .header("authorization", format!("Bearer {}", SERVICE_KEY))
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let json: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["deleted"], 0);
}

#[tokio::test]
async fn test_csv_template_download() {
    let app = test_app();

    let response = app
        .oneshot(
            request("GET", "/api/admin/import/template")
                .header("authorization", format!("Bearer {}", SERVICE_KEY))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get("content-type").unwrap(),
        "text/csv"
    );

    let bytes = to_bytes(response.into_body(), 1024 * 1024).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.starts_with("Full Name,Email,Company Name"));
}

#[tokio::test]
async fn test_admin_routes_forbid_service_keyless_sessions() {
    // A made-up bearer token is a session lookup, and the disconnected
    // test database turns that into a 500 rather than a silent pass.
    let app = test_app();
    let response = app
        .oneshot(
            request("GET", "/api/admin/investors/stats")
                .header("authorization", "Bearer not-a-real-session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::OK);
}
