//! レート制限（スライディングウィンドウ）
//!
//! オペレーターごとのスキャン数を監査ログへの問い合わせで数える。
//! ウィンドウは毎チェック時に「now - window」から再計算されるローリング
//! ウィンドウであり、周期リセット型ではない。独立したカウンター状態を
//! 持たないため、ログとの間にドリフトが発生しない。
//!
//! カウントはベストエフォートのスナップショット。同一オペレーターの並行
//! 検証が両方ともしきい値未満のカウントを読み、双方が通過して一時的に
//! 名目上の上限を超えることがある。リミッターの目的は濫用の減衰であって
//! 厳密なクォータではないため、境界での競合は許容する。

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::common::error::HallResult;
use crate::config::ScanRateConfig;
use crate::db::traits::ScanLogRepository;
use crate::scan::types::RateCheck;

/// スライディングウィンドウ式レートリミッター
#[derive(Clone)]
pub struct RateLimiter {
    scan_log: Arc<dyn ScanLogRepository>,
    config: ScanRateConfig,
}

impl RateLimiter {
    /// 新しいRateLimiterを作成
    pub fn new(scan_log: Arc<dyn ScanLogRepository>, config: ScanRateConfig) -> Self {
        Self { scan_log, config }
    }

    /// 設定されているしきい値
    pub fn limit(&self) -> i64 {
        self.config.limit
    }

    /// オペレーターのウィンドウ内スキャン数を数え、許可可否を返す
    ///
    /// 読み取りのみで副作用はない。拒否された試行の記録（`RATE_LIMITED`
    /// アウトカムの追記）はバリデータ側で行われ、その記録自体も以降の
    /// ウィンドウにカウントされる。
    pub async fn check(&self, operator: &str, now: DateTime<Utc>) -> HallResult<RateCheck> {
        let since = now - self.config.window();
        let current_count = self.scan_log.count_since(operator, since).await?;
        Ok(RateCheck {
            allowed: current_count < self.config.limit,
            current_count,
        })
    }
}
