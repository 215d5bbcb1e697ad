//! 認証API Contract Tests
//!
//! POST /api/auth/login, GET /api/auth/me

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use examhall::common::auth::UserRole;
use serde_json::{json, Value};
use serial_test::serial;
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn build_app() -> (Router, SqlitePool) {
    let (app, pool) = crate::support::create_test_app().await;
    crate::support::seed_user(&pool, "admin", "password123", UserRole::Admin).await;
    crate::support::seed_user(&pool, "invig1", "scanner456", UserRole::Invigilator).await;
    (app, pool)
}

async fn login(app: &Router, username: &str, password: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "username": username,
                        "password": password
                    }))
                    .unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, value)
}

// ---------------------------------------------------------------------------
// POST /api/auth/login
// ---------------------------------------------------------------------------

/// 管理者ログイン成功
#[tokio::test]
#[serial]
async fn test_login_success_admin() {
    let (app, _pool) = build_app().await;
    let (status, body) = login(&app, "admin", "password123").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].is_string());
    assert_eq!(body["expires_in"], 86400);
    assert_eq!(body["user"]["username"], "admin");
    assert_eq!(body["user"]["role"], "admin");
}

/// 試験監督ログイン成功
#[tokio::test]
#[serial]
async fn test_login_success_invigilator() {
    let (app, _pool) = build_app().await;
    let (status, body) = login(&app, "invig1", "scanner456").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["role"], "invigilator");
}

/// 存在しないユーザーでログイン失敗
#[tokio::test]
#[serial]
async fn test_login_failure_unknown_user() {
    let (app, _pool) = build_app().await;
    let (status, _body) = login(&app, "ghost", "password123").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// パスワード誤りでログイン失敗
#[tokio::test]
#[serial]
async fn test_login_failure_wrong_password() {
    let (app, _pool) = build_app().await;
    let (status, _body) = login(&app, "admin", "wrongpassword").await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

/// ユーザー名なしのリクエストは422
#[tokio::test]
#[serial]
async fn test_login_missing_username_returns_422() {
    let (app, _pool) = build_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/login")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"password": "password123"})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// GET /api/auth/me
// ---------------------------------------------------------------------------

/// トークンで認証情報を確認できる
#[tokio::test]
#[serial]
async fn test_me_returns_operator_identity() {
    let (app, _pool) = build_app().await;
    let (_, body) = login(&app, "invig1", "scanner456").await;
    let token = body["token"].as_str().unwrap();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let me: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(me["username"], "invig1");
    assert_eq!(me["role"], "invigilator");
}

/// トークンなしでは401
#[tokio::test]
#[serial]
async fn test_me_without_token_is_401() {
    let (app, _pool) = build_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/me")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
