//! Repository traitパターン定義
//!
//! スキャンバリデータのコラボレーターを抽象化するtrait群。
//! 本番実装はSQLiteベース（`students` / `exams` / `scan_log` モジュール）、
//! テストでは呼び出し回数を検証できるモック実装を差し込む。

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::common::error::HallResult;
use crate::common::types::{Exam, Student};
use crate::scan::types::ScanAttempt;

/// 学生ディレクトリ
#[async_trait]
pub trait StudentDirectory: Send + Sync {
    /// 学籍番号の完全一致で学生を解決する
    async fn find_by_identifier(&self, student_identifier: &str) -> HallResult<Option<Student>>;
}

/// 試験ディレクトリ
#[async_trait]
pub trait ExamDirectory: Send + Sync {
    /// 試験を解決する（受験登録名簿も実体化して返す）
    async fn find_by_id(&self, exam_id: i64) -> HallResult<Option<Exam>>;
}

/// 監査ログストレージ
///
/// 追記専用。レコードは書き込み後に変更・削除されない（保持期間の管理は
/// 本コアの対象外）。並行appendは各レコードが独立した1書き込みであるため
/// 互いに破壊しない。
#[async_trait]
pub trait ScanLogRepository: Send + Sync {
    /// スキャン試行を追記し、採番されたIDを返す
    async fn append(&self, attempt: &ScanAttempt) -> HallResult<i64>;

    /// 指定時刻以降のオペレーターのスキャン数を数える（レート制限用）
    async fn count_since(&self, operator: &str, since: DateTime<Utc>) -> HallResult<i64>;

    /// 指定時刻以降の失敗スキャンを新しい順に返す（セキュリティレビュー用）
    async fn recent_failures(&self, since: DateTime<Utc>) -> HallResult<Vec<ScanAttempt>>;

    /// 指定試験のスキャン履歴を新しい順に返す
    async fn find_by_exam(&self, exam_id: i64) -> HallResult<Vec<ScanAttempt>>;
}
