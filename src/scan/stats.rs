//! オペレーター別統計レポーター
//!
//! 監査ログの純粋な集計。独立した状態は持たない。

use chrono::{Duration, Utc};

use crate::common::error::{HallError, HallResult};
use crate::config::ScanRateConfig;
use crate::db::traits::ScanLogRepository;
use crate::scan::types::ScanStatistics;

/// 集計ウィンドウの上限（1年）
pub const MAX_WINDOW_HOURS: i64 = 24 * 365;

/// 集計ウィンドウ時間数の範囲チェック
///
/// `chrono::Duration::hours` は範囲外の値でパニックするため、クエリ由来の
/// 値は減算前に必ずここを通す。
pub fn validate_window_hours(window_hours: i64) -> HallResult<()> {
    if !(1..=MAX_WINDOW_HOURS).contains(&window_hours) {
        return Err(HallError::Validation(format!(
            "window hours must be between 1 and {}",
            MAX_WINDOW_HOURS
        )));
    }
    Ok(())
}

/// 指定オペレーターの直近 `window_hours` 時間のスキャン統計を集計する
pub async fn stats_for(
    scan_log: &dyn ScanLogRepository,
    config: &ScanRateConfig,
    operator: &str,
    window_hours: i64,
) -> HallResult<ScanStatistics> {
    validate_window_hours(window_hours)?;
    let since = Utc::now() - Duration::hours(window_hours);
    let total_scans = scan_log.count_since(operator, since).await?;

    Ok(ScanStatistics {
        operator: operator.to_string(),
        total_scans,
        limit_threshold: config.limit,
    })
}
