//! ロギング初期化（tracing-subscriber）

use crate::common::error::HallError;
use tracing_subscriber::EnvFilter;

/// tracingサブスクライバーを初期化する
///
/// フィルタは `EXAMHALL_LOG` を優先し、未設定なら `RUST_LOG`、
/// どちらも無ければ `info` を使う。
pub fn init() -> Result<(), HallError> {
    let filter = std::env::var("EXAMHALL_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(true)
        .try_init()
        .map_err(|e| HallError::Internal(format!("Failed to initialize logging: {}", e)))
}
