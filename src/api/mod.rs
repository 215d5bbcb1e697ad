//! REST APIハンドラーとルーター構築

use axum::{
    middleware as axum_middleware,
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::auth::middleware::{jwt_auth_middleware, require_admin_middleware};
use crate::AppState;

/// 認証API
pub mod auth;

/// エラーレスポンス型
pub mod error;

/// IDカード発行API
pub mod id_cards;

/// スキャン検証API
pub mod scans;

/// GET /api/health - ヘルスチェック
async fn health() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

/// アプリケーションルーターを構築する
///
/// * 公開: ヘルスチェック・ログイン
/// * 認証必須: スキャン検証・統計・IDカード発行
/// * 管理者のみ: 失敗一覧・試験別監査履歴
pub fn create_app(state: AppState) -> Router {
    let admin_routes = Router::new()
        .route("/api/barcode/failures", get(scans::list_recent_failures))
        .route("/api/barcode/scans/:exam_id", get(scans::list_scans_by_exam))
        .layer(axum_middleware::from_fn(require_admin_middleware));

    let protected_routes = Router::new()
        .route("/api/auth/me", get(auth::me))
        .route("/api/barcode/validate", post(scans::validate_scan))
        .route("/api/barcode/stats", get(scans::get_scan_stats))
        .route("/api/barcode/id-cards", get(id_cards::list_id_cards))
        .route(
            "/api/barcode/id-cards/search",
            get(id_cards::search_id_cards),
        )
        .merge(admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            jwt_auth_middleware,
        ));

    Router::new()
        .route("/api/health", get(health))
        .route("/api/auth/login", post(auth::login))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
