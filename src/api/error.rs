//! APIエラーレスポンス型
//!
//! axum用の共通エラーハンドリング

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::common::error::HallError;

/// Axum用のエラーレスポンス型
#[derive(Debug)]
pub struct AppError(pub HallError);

impl From<HallError> for AppError {
    fn from(err: HallError) -> Self {
        AppError(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        // external_message() で内部詳細（SQL断片・パス等）の露出を避ける。
        // 完全なエラー内容はサーバーログにのみ残す。
        tracing::error!("API error: {}", self.0);

        let status = match &self.0 {
            HallError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HallError::NotFound(_) => StatusCode::NOT_FOUND,
            HallError::Validation(_) => StatusCode::BAD_REQUEST,
            HallError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HallError::Jwt(_) => StatusCode::INTERNAL_SERVER_ERROR,
            HallError::Authentication(_) => StatusCode::UNAUTHORIZED,
            HallError::Authorization(_) => StatusCode::FORBIDDEN,
            HallError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let payload = json!({
            "error": self.0.external_message()
        });

        (status, Json(payload)).into_response()
    }
}
