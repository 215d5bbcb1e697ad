//! スキャン監査ログストレージ
//!
//! `barcode_scans` テーブルへの追記と集計。追記専用で、レコードの更新・
//! 削除APIは提供しない。タイムスタンプは固定幅のRFC3339（マイクロ秒、
//! `Z` サフィックス）で格納し、文字列比較がそのまま時刻順比較になるよう
//! にしている。

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::common::error::{HallError, HallResult};
use crate::db::traits::ScanLogRepository;
use crate::scan::types::{ScanAttempt, ScanOutcome};

/// タイムスタンプをDB格納形式に変換する
///
/// 固定幅フォーマットでないと文字列比較が時刻順にならない。
fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// 監査ログのDB操作
#[derive(Clone)]
pub struct ScanLogStorage {
    pool: SqlitePool,
}

/// sqlx::FromRow用の行構造体
#[derive(Debug, sqlx::FromRow)]
struct ScanAttemptRow {
    id: i64,
    scanned_value: String,
    student_id: Option<i64>,
    exam_id: Option<i64>,
    operator: String,
    outcome: String,
    detail: Option<String>,
    scanned_at: String,
}

impl TryFrom<ScanAttemptRow> for ScanAttempt {
    type Error = HallError;

    fn try_from(row: ScanAttemptRow) -> Result<Self, Self::Error> {
        let scanned_at = chrono::DateTime::parse_from_rfc3339(&row.scanned_at)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| HallError::Database(format!("Failed to parse scanned_at: {}", e)))?;

        let outcome = row
            .outcome
            .parse::<ScanOutcome>()
            .map_err(|_| HallError::Database(format!("Unknown scan outcome: {}", row.outcome)))?;

        Ok(ScanAttempt {
            id: Some(row.id),
            scanned_value: row.scanned_value,
            student_id: row.student_id,
            exam_id: row.exam_id,
            operator: row.operator,
            outcome,
            detail: row.detail,
            scanned_at,
        })
    }
}

const SELECT_COLUMNS: &str =
    "id, scanned_value, student_id, exam_id, operator, outcome, detail, scanned_at";

impl ScanLogStorage {
    /// 新しいScanLogStorageを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// スキャン試行を追記し、採番されたIDを返す
    ///
    /// 1件のINSERTで完結するため、並行appendでもレコードが交錯しない。
    pub async fn append(&self, attempt: &ScanAttempt) -> HallResult<i64> {
        let result = sqlx::query(
            "INSERT INTO barcode_scans (
                scanned_value, student_id, exam_id, operator, outcome, detail, scanned_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&attempt.scanned_value)
        .bind(attempt.student_id)
        .bind(attempt.exam_id)
        .bind(&attempt.operator)
        .bind(attempt.outcome.as_str())
        .bind(&attempt.detail)
        .bind(format_timestamp(&attempt.scanned_at))
        .execute(&self.pool)
        .await
        .map_err(|e| HallError::Database(format!("Failed to append scan attempt: {}", e)))?;

        Ok(result.last_insert_rowid())
    }

    /// 指定時刻以降のオペレーターのスキャン数を数える
    pub async fn count_since(&self, operator: &str, since: DateTime<Utc>) -> HallResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM barcode_scans WHERE operator = ? AND scanned_at >= ?",
        )
        .bind(operator)
        .bind(format_timestamp(&since))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| HallError::Database(format!("Failed to count scans: {}", e)))?;

        Ok(count)
    }

    /// 指定時刻以降の失敗スキャンを新しい順に返す
    pub async fn recent_failures(&self, since: DateTime<Utc>) -> HallResult<Vec<ScanAttempt>> {
        let sql = format!(
            "SELECT {} FROM barcode_scans
             WHERE outcome != 'SUCCESS' AND scanned_at >= ?
             ORDER BY scanned_at DESC, id DESC",
            SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ScanAttemptRow>(&sql)
            .bind(format_timestamp(&since))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| HallError::Database(format!("Failed to query failed scans: {}", e)))?;

        rows.into_iter().map(ScanAttempt::try_from).collect()
    }

    /// 指定試験のスキャン履歴を新しい順に返す
    pub async fn find_by_exam(&self, exam_id: i64) -> HallResult<Vec<ScanAttempt>> {
        let sql = format!(
            "SELECT {} FROM barcode_scans
             WHERE exam_id = ?
             ORDER BY scanned_at DESC, id DESC",
            SELECT_COLUMNS
        );
        let rows = sqlx::query_as::<_, ScanAttemptRow>(&sql)
            .bind(exam_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| HallError::Database(format!("Failed to query exam scans: {}", e)))?;

        rows.into_iter().map(ScanAttempt::try_from).collect()
    }
}

#[async_trait]
impl ScanLogRepository for ScanLogStorage {
    async fn append(&self, attempt: &ScanAttempt) -> HallResult<i64> {
        ScanLogStorage::append(self, attempt).await
    }

    async fn count_since(&self, operator: &str, since: DateTime<Utc>) -> HallResult<i64> {
        ScanLogStorage::count_since(self, operator, since).await
    }

    async fn recent_failures(&self, since: DateTime<Utc>) -> HallResult<Vec<ScanAttempt>> {
        ScanLogStorage::recent_failures(self, since).await
    }

    async fn find_by_exam(&self, exam_id: i64) -> HallResult<Vec<ScanAttempt>> {
        ScanLogStorage::find_by_exam(self, exam_id).await
    }
}
