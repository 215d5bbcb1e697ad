//! Configuration management via environment variables
//!
//! 環境変数ヘルパーとスキャンレート制限設定。

use chrono::Duration;

/// Get an environment variable
///
/// # Returns
/// * `Some(value)` - The environment variable value
/// * `None` - The variable is not set
pub fn get_env(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Get an environment variable with a default value
pub fn get_env_or(name: &str, default: &str) -> String {
    get_env(name).unwrap_or_else(|| default.to_string())
}

/// Get an environment variable, parsing to a specific type
///
/// Returns the default if the variable is not set or parsing fails.
pub fn get_env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    get_env(name).and_then(|s| s.parse().ok()).unwrap_or(default)
}

/// スキャンレート制限設定
///
/// しきい値はローリングウィンドウ（デフォルト: 直近60秒）あたりの
/// スキャン試行数の上限。カウントは監査ログへの問い合わせで毎回
/// 再計算され、独立したカウンター状態は持たない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanRateConfig {
    /// ウィンドウあたりの最大スキャン数
    pub limit: i64,
    /// ウィンドウ長（秒）
    pub window_secs: i64,
}

impl ScanRateConfig {
    /// Load scan rate configuration from environment variables.
    ///
    /// * `EXAMHALL_SCAN_RATE_LIMIT` - ウィンドウあたりの最大スキャン数（デフォルト: 100）
    /// * `EXAMHALL_SCAN_RATE_WINDOW_SECS` - ウィンドウ長秒数（デフォルト: 60）
    pub fn from_env() -> Self {
        let limit = get_env_parse("EXAMHALL_SCAN_RATE_LIMIT", 100i64);
        let window_secs = get_env_parse("EXAMHALL_SCAN_RATE_WINDOW_SECS", 60i64);
        Self { limit, window_secs }
    }

    /// ウィンドウ長を `chrono::Duration` として返す
    pub fn window(&self) -> Duration {
        Duration::seconds(self.window_secs)
    }
}

impl Default for ScanRateConfig {
    fn default() -> Self {
        Self {
            limit: 100,
            window_secs: 60,
        }
    }
}
