//! エラー型定義
//!
//! 統一エラー型（thiserror使用）
//!
//! ビジネスルール上の失敗（レート制限超過・未登録学生など）はエラーではなく
//! [`crate::scan::types::ScanOutcome`] で表現する。ここで定義するのは
//! インフラ障害と認証・入力エラーのみ。

use thiserror::Error;

/// exam hall backend error type
#[derive(Debug, Error)]
pub enum HallError {
    /// Database error
    #[error("Database error: {0}")]
    Database(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Password hash error
    #[error("Password hash error: {0}")]
    PasswordHash(String),

    /// JWT error
    #[error("JWT error: {0}")]
    Jwt(String),

    /// Authentication error
    #[error("Authentication error: {0}")]
    Authentication(String),

    /// Authorization error
    #[error("Authorization error: {0}")]
    Authorization(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HallError {
    /// Returns a safe error message for external clients.
    ///
    /// Full error details go to server logs only; this message must not
    /// expose internal identifiers, file paths or SQL fragments.
    pub fn external_message(&self) -> &'static str {
        match self {
            Self::Database(_) => "Database error",
            Self::NotFound(_) => "Not found",
            Self::Validation(_) => "Invalid request",
            Self::PasswordHash(_) => "Authentication error",
            Self::Jwt(_) => "Authentication error",
            Self::Authentication(_) => "Authentication failed",
            Self::Authorization(_) => "Access denied",
            Self::Internal(_) => "Internal server error",
        }
    }
}

/// Result type alias
pub type HallResult<T> = Result<T, HallError>;
