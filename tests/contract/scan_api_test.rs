//! スキャン検証API Contract Tests
//!
//! POST /api/barcode/validate, GET /api/barcode/stats,
//! GET /api/barcode/failures, GET /api/barcode/scans/{exam_id}

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use examhall::common::auth::UserRole;
use examhall::config::ScanRateConfig;
use serde_json::{json, Value};
use serial_test::serial;
use sqlx::SqlitePool;
use tower::ServiceExt;

async fn build_app() -> (Router, SqlitePool) {
    build_app_with_config(ScanRateConfig::default()).await
}

async fn build_app_with_config(config: ScanRateConfig) -> (Router, SqlitePool) {
    let (app, pool) = crate::support::create_test_app_with_config(config).await;

    crate::support::seed_user(&pool, "admin", "password123", UserRole::Admin).await;
    crate::support::seed_user(&pool, "invig1", "scanner456", UserRole::Invigilator).await;
    crate::support::seed_user(&pool, "invig2", "scanner789", UserRole::Invigilator).await;

    let alice = crate::support::seed_student(&pool, "BCS25165336", "Alice Mwangi").await;
    crate::support::seed_student(&pool, "BCS25165337", "Brian Otieno").await;
    crate::support::seed_exam_with_roster(&pool, &[&alice]).await;

    (app, pool)
}

async fn login(app: &Router, username: &str, password: &str) -> String {
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
    assert_eq!(response.status(), StatusCode::OK);
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value: Value = serde_json::from_slice(&body).unwrap();
    value["token"].as_str().unwrap().to_string()
}

async fn validate(app: &Router, token: &str, barcode: &str, exam_id: i64) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/barcode/validate")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({
                        "scannedBarcode": barcode,
                        "examId": exam_id
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

async fn get_with_token(app: &Router, token: &str, uri: &str) -> (StatusCode, Value) {
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .header("authorization", format!("Bearer {}", token))
                .body(Body::empty())
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
// POST /api/barcode/validate
// ---------------------------------------------------------------------------

/// 登録済み学生のスキャンは200
#[tokio::test]
#[serial]
async fn test_validate_enrolled_student_success() {
    let (app, _pool) = build_app().await;
    let token = login(&app, "invig1", "scanner456").await;

    let (status, body) = validate(&app, &token, "BCS25165336", 1).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["outcome"], "SUCCESS");
    assert_eq!(body["studentName"], "Alice Mwangi");
    assert_eq!(body["examId"], 1);
    assert!(body["timestamp"].is_string());
}

/// 未知のバーコードは403（理由付き）
#[tokio::test]
#[serial]
async fn test_validate_unknown_barcode_forbidden() {
    let (app, _pool) = build_app().await;
    let token = login(&app, "invig1", "scanner456").await;

    let (status, body) = validate(&app, &token, "UNKNOWN999", 1).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["outcome"], "STUDENT_NOT_FOUND");
    assert_eq!(body["message"], "Student not found: UNKNOWN999");
}

/// 未登録学生は403で氏名付きの理由
#[tokio::test]
#[serial]
async fn test_validate_not_enrolled_forbidden() {
    let (app, _pool) = build_app().await;
    let token = login(&app, "invig1", "scanner456").await;

    let (status, body) = validate(&app, &token, "BCS25165337", 1).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["outcome"], "NOT_ENROLLED");
    assert_eq!(
        body["message"],
        "Student Brian Otieno is not enrolled in this exam"
    );
}

/// 存在しない試験は403
#[tokio::test]
#[serial]
async fn test_validate_unknown_exam_forbidden() {
    let (app, _pool) = build_app().await;
    let token = login(&app, "invig1", "scanner456").await;

    let (status, body) = validate(&app, &token, "BCS25165336", 999).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["outcome"], "EXAM_NOT_FOUND");
}

/// レート制限超過は403、試行自体も記録される
#[tokio::test]
#[serial]
async fn test_validate_rate_limited_and_recorded() {
    let config = ScanRateConfig {
        limit: 2,
        window_secs: 60,
    };
    let (app, pool) = build_app_with_config(config).await;
    let token = login(&app, "invig1", "scanner456").await;

    let (s1, _) = validate(&app, &token, "BCS25165336", 1).await;
    let (s2, _) = validate(&app, &token, "BCS25165336", 1).await;
    assert_eq!(s1, StatusCode::OK);
    assert_eq!(s2, StatusCode::OK);

    let (s3, body) = validate(&app, &token, "BCS25165336", 1).await;
    assert_eq!(s3, StatusCode::FORBIDDEN);
    assert_eq!(body["outcome"], "RATE_LIMITED");
    assert!(body["studentName"].is_null());

    // 拒否された試行も監査ログに1件として残る
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM barcode_scans")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count, 3);
}

/// 認証なしの検証リクエストは401
#[tokio::test]
#[serial]
async fn test_validate_requires_auth() {
    let (app, _pool) = build_app().await;

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/barcode/validate")
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"scannedBarcode": "x", "examId": 1})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

/// 数値でないexamIdはデシリアライズ段階で422
#[tokio::test]
#[serial]
async fn test_validate_non_numeric_exam_id_is_422() {
    let (app, _pool) = build_app().await;
    let token = login(&app, "invig1", "scanner456").await;

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/barcode/validate")
                .header("authorization", format!("Bearer {}", token))
                .header("content-type", "application/json")
                .body(Body::from(
                    serde_json::to_vec(&json!({"scannedBarcode": "x", "examId": "abc"})).unwrap(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// ---------------------------------------------------------------------------
// GET /api/barcode/stats
// ---------------------------------------------------------------------------

/// 統計は認証済みオペレーター自身の分だけを数える
#[tokio::test]
#[serial]
async fn test_stats_per_operator() {
    let (app, _pool) = build_app().await;
    let token1 = login(&app, "invig1", "scanner456").await;
    let token2 = login(&app, "invig2", "scanner789").await;

    validate(&app, &token1, "BCS25165336", 1).await;
    validate(&app, &token1, "UNKNOWN999", 1).await;
    validate(&app, &token2, "BCS25165336", 1).await;

    let (status, body) = get_with_token(&app, &token1, "/api/barcode/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["operator"], "invig1");
    assert_eq!(body["totalScans"], 2);
    assert_eq!(body["limitThreshold"], 100);
}

/// ウィンドウ時間数が範囲外の統計リクエストは400（パニックしない）
#[tokio::test]
#[serial]
async fn test_stats_out_of_range_window_is_400() {
    let (app, _pool) = build_app().await;
    let token = login(&app, "invig1", "scanner456").await;

    let (status, body) = get_with_token(
        &app,
        &token,
        "/api/barcode/stats?window_hours=9223372036854775807",
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

// ---------------------------------------------------------------------------
// GET /api/barcode/failures (admin only)
// ---------------------------------------------------------------------------

/// 失敗一覧は管理者が新しい順に取得できる
#[tokio::test]
#[serial]
async fn test_failures_admin_newest_first() {
    let (app, _pool) = build_app().await;
    let operator = login(&app, "invig1", "scanner456").await;
    let admin = login(&app, "admin", "password123").await;

    validate(&app, &operator, "BCS25165336", 1).await; // success
    validate(&app, &operator, "UNKNOWN999", 1).await;
    validate(&app, &operator, "BCS25165337", 1).await;

    let (status, body) = get_with_token(&app, &admin, "/api/barcode/failures").await;

    assert_eq!(status, StatusCode::OK);
    let failures = body.as_array().unwrap();
    assert_eq!(failures.len(), 2);
    assert_eq!(failures[0]["scannedValue"], "BCS25165337");
    assert_eq!(failures[0]["outcome"], "NOT_ENROLLED");
    assert_eq!(failures[1]["outcome"], "STUDENT_NOT_FOUND");
}

/// 失敗一覧は試験監督には403
#[tokio::test]
#[serial]
async fn test_failures_forbidden_for_invigilator() {
    let (app, _pool) = build_app().await;
    let operator = login(&app, "invig1", "scanner456").await;

    let (status, _) = get_with_token(&app, &operator, "/api/barcode/failures").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}

// ---------------------------------------------------------------------------
// GET /api/barcode/scans/{exam_id} (admin only)
// ---------------------------------------------------------------------------

/// 試験別監査履歴は管理者が取得できる
#[tokio::test]
#[serial]
async fn test_scans_by_exam_admin() {
    let (app, _pool) = build_app().await;
    let operator = login(&app, "invig1", "scanner456").await;
    let admin = login(&app, "admin", "password123").await;

    validate(&app, &operator, "BCS25165336", 1).await;
    validate(&app, &operator, "BCS25165337", 1).await;

    let (status, body) = get_with_token(&app, &admin, "/api/barcode/scans/1").await;

    assert_eq!(status, StatusCode::OK);
    let scans = body.as_array().unwrap();
    assert_eq!(scans.len(), 2);
    assert!(scans.iter().all(|s| s["examId"] == 1));
    assert!(scans.iter().all(|s| s["operator"] == "invig1"));
}

/// 試験別監査履歴は試験監督には403
#[tokio::test]
#[serial]
async fn test_scans_by_exam_forbidden_for_invigilator() {
    let (app, _pool) = build_app().await;
    let operator = login(&app, "invig1", "scanner456").await;

    let (status, _) = get_with_token(&app, &operator, "/api/barcode/scans/1").await;

    assert_eq!(status, StatusCode::FORBIDDEN);
}
