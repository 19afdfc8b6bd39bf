//! Router tests that need no running database.
//!
//! The pool connects lazily, so every request below must be answered
//! before the handler touches the database: authentication, permission
//! checks and static endpoints.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::Utc;
use serde_json::{json, Value};
use sqlx::postgres::PgPoolOptions;
use tower::ServiceExt;

use locallibrary_server::{
    api,
    config::AppConfig,
    models::user::{Permission, UserClaims},
    repository::Repository,
    services::Services,
    AppState,
};

fn app() -> (Router, AppConfig) {
    let config = AppConfig::default();
    let pool = PgPoolOptions::new()
        .connect_lazy(&config.database.url)
        .expect("Failed to build lazy pool");
    let services = Services::new(Repository::new(pool), &config);

    let state = AppState {
        config: Arc::new(config.clone()),
        services: Arc::new(services),
    };
    (api::create_router(state), config)
}

fn token(config: &AppConfig, permissions: Vec<Permission>) -> String {
    let now = Utc::now().timestamp();
    UserClaims {
        sub: "reader".to_string(),
        user_id: 7,
        permissions,
        exp: now + 3600,
        iat: now,
    }
    .create_token(&config.auth.jwt_secret)
    .expect("Failed to sign token")
}

fn request(method: Method, uri: &str, bearer: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", bearer));
    }
    match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("Failed to build request"),
        None => builder.body(Body::empty()).expect("Failed to build request"),
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Failed to read body");
    serde_json::from_slice(&bytes).expect("Body is not JSON")
}

const INSTANCE: &str = "3f2b8c4e-0000-4000-8000-000000000001";

#[tokio::test]
async fn test_health_check() {
    let (app, _) = app();

    let response = app
        .oneshot(request(Method::GET, "/api/v1/health", None, None))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_borrow_requires_authentication() {
    let (app, _) = app();
    let uri = format!("/api/v1/instances/{}/borrow", INSTANCE);

    let response = app
        .oneshot(request(Method::POST, &uri, None, None))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = json_body(response).await;
    assert_eq!(body["error"], "NotAuthenticated");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let (app, mut config) = app();
    config.auth.jwt_secret = "another-secret".to_string();
    let bearer = token(&config, vec![Permission::CanMarkReturned]);

    let response = app
        .oneshot(request(Method::GET, "/api/v1/loans/mine", Some(&bearer), None))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_renew_requires_mark_returned() {
    let (app, config) = app();
    let bearer = token(&config, vec![Permission::CanViewAllLoans]);
    let uri = format!("/api/v1/instances/{}/renew", INSTANCE);

    let response = app
        .oneshot(request(
            Method::POST,
            &uri,
            Some(&bearer),
            Some(json!({ "renewal_date": Utc::now().date_naive().to_string() })),
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = json_body(response).await;
    assert_eq!(body["error"], "PermissionDenied");
}

#[tokio::test]
async fn test_renewal_proposal_requires_mark_returned() {
    let (app, config) = app();
    let bearer = token(&config, vec![]);
    let uri = format!("/api/v1/instances/{}/renew", INSTANCE);

    let response = app
        .oneshot(request(Method::GET, &uri, Some(&bearer), None))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_return_requires_mark_returned() {
    let (app, config) = app();
    let bearer = token(&config, vec![Permission::CanEditBook]);
    let uri = format!("/api/v1/instances/{}/return", INSTANCE);

    let response = app
        .oneshot(request(Method::POST, &uri, Some(&bearer), None))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_all_loans_requires_librarian() {
    let (app, config) = app();
    let bearer = token(&config, vec![]);

    let response = app
        .oneshot(request(Method::GET, "/api/v1/loans", Some(&bearer), None))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_create_author_requires_manage_authors() {
    let (app, config) = app();
    let bearer = token(&config, vec![Permission::CanMarkReturned]);

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/v1/authors",
            Some(&bearer),
            Some(json!({ "first_name": "Mary", "last_name": "Shelley" })),
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invalid_instance_id_is_rejected() {
    let (app, config) = app();
    let bearer = token(&config, vec![]);

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/v1/instances/not-a-uuid/borrow",
            Some(&bearer),
            None,
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blank_genre_name_is_rejected() {
    let (app, config) = app();
    let bearer = token(&config, vec![Permission::CanEditBook]);

    let response = app
        .oneshot(request(
            Method::POST,
            "/api/v1/genres",
            Some(&bearer),
            Some(json!({ "name": "   " })),
        ))
        .await
        .expect("Request failed");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert_eq!(body["error"], "BadValue");
}
