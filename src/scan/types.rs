//! スキャン関連の型定義

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::common::error::HallError;
use crate::common::types::{Exam, Student};

/// スキャン検証の終端アウトカム
///
/// ビジネスルール上の失敗はエラーではなくこの列挙で表現する。
/// 呼び出し側はアウトカムで網羅的にパターンマッチする。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScanOutcome {
    /// すべてのチェックを通過
    Success,
    /// オペレーターのレート制限超過
    RateLimited,
    /// スキャン値に一致する学生が存在しない
    StudentNotFound,
    /// 対象試験が存在しない
    ExamNotFound,
    /// 学生は存在するが当該試験に未登録
    NotEnrolled,
}

impl ScanOutcome {
    /// DB格納用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanOutcome::Success => "SUCCESS",
            ScanOutcome::RateLimited => "RATE_LIMITED",
            ScanOutcome::StudentNotFound => "STUDENT_NOT_FOUND",
            ScanOutcome::ExamNotFound => "EXAM_NOT_FOUND",
            ScanOutcome::NotEnrolled => "NOT_ENROLLED",
        }
    }

    /// 成功アウトカムか
    pub fn is_success(&self) -> bool {
        matches!(self, ScanOutcome::Success)
    }
}

impl std::str::FromStr for ScanOutcome {
    type Err = HallError;

    /// DB格納文字列からの復元
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SUCCESS" => Ok(ScanOutcome::Success),
            "RATE_LIMITED" => Ok(ScanOutcome::RateLimited),
            "STUDENT_NOT_FOUND" => Ok(ScanOutcome::StudentNotFound),
            "EXAM_NOT_FOUND" => Ok(ScanOutcome::ExamNotFound),
            "NOT_ENROLLED" => Ok(ScanOutcome::NotEnrolled),
            _ => Err(HallError::Validation(format!("Unknown scan outcome: {}", s))),
        }
    }
}

/// スキャン試行の監査レコード
///
/// 書き込み後は不変。バリデータの呼び出し1回につき正確に1件追記される。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanAttempt {
    /// 行ID（追記時に採番、未保存ならNone）
    pub id: Option<i64>,
    /// スキャンされた生の値（学籍番号とは限らない）
    pub scanned_value: String,
    /// 解決された学生の行ID（未解決ならNone）
    pub student_id: Option<i64>,
    /// 解決された試験の行ID（試験ID自体が解決しない場合のみNone）
    pub exam_id: Option<i64>,
    /// スキャンを行った試験監督のユーザー名
    pub operator: String,
    /// 検証アウトカム
    pub outcome: ScanOutcome,
    /// 失敗時の補足説明（成功時はNone）
    pub detail: Option<String>,
    /// スキャン時刻（検証時に付与、UTC）
    pub scanned_at: DateTime<Utc>,
}

/// スキャン検証の結果
///
/// ビジネスルール上の失敗も成功と同じ構造で返る。`Err` になるのは
/// インフラ障害（ストレージ到達不能など）のみ。
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    /// 終端アウトカム
    pub outcome: ScanOutcome,
    /// 解決された学生（StudentLookup通過後に設定）
    pub student: Option<Student>,
    /// 解決された試験（ExamLookup通過後に設定）
    pub exam: Option<Exam>,
    /// 失敗時の補足説明
    pub detail: Option<String>,
    /// 検証時刻
    pub timestamp: DateTime<Utc>,
}

impl ValidationResult {
    /// すべてのチェックを通過したか
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }
}

/// レート制限チェックの結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateCheck {
    /// このスキャンを許可するか
    pub allowed: bool,
    /// 現在のウィンドウ内スキャン数
    pub current_count: i64,
}

/// オペレーター別スキャン統計
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanStatistics {
    /// オペレーター（試験監督のユーザー名）
    pub operator: String,
    /// 集計ウィンドウ内の総スキャン数
    pub total_scans: i64,
    /// 設定されているレート制限しきい値（毎分）
    pub limit_threshold: i64,
}
