//! スキャンバリデータ（ステートマシン本体）
//!
//! スキャンイベント（生のスキャン値・対象試験ID・オペレーター）を受け取り、
//! 固定順のチェックパイプラインを実行して終端アウトカムを決定する。
//! 最初に失敗したチェックがアウトカムを決め、以降のチェックは評価しない。
//!
//! 完了した呼び出し1回につき、どのチェックで失敗したかに関わらず正確に
//! 1件の監査レコードを追記する。追記は呼び出し元へ制御を返す前に行う。
//! ストレージ到達不能などのインフラ障害のみ `Err` として伝播し、その場合は
//! レコードを1件も書かない（部分コミットしない）。

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::common::error::HallResult;
use crate::common::types::{Exam, Student};
use crate::config::ScanRateConfig;
use crate::db::traits::{ExamDirectory, ScanLogRepository, StudentDirectory};
use crate::scan::rate_limit::RateLimiter;
use crate::scan::types::{ScanAttempt, ScanOutcome, ValidationResult};

/// スキャン検証パイプライン
///
/// チェック順: レート制限 → 学生照合 → 試験照合 → 受験登録判定。
/// レート制限を先頭に置くことで、エンドポイントへのフラッディングを
/// 学籍番号の列挙に使えないようにしている（ペイロードの有効性に関わらず
/// スロットルが一様に適用される）。
#[derive(Clone)]
pub struct ScanValidator {
    students: Arc<dyn StudentDirectory>,
    exams: Arc<dyn ExamDirectory>,
    scan_log: Arc<dyn ScanLogRepository>,
    rate_limiter: RateLimiter,
    config: ScanRateConfig,
}

impl ScanValidator {
    /// 新しいScanValidatorを作成
    pub fn new(
        students: Arc<dyn StudentDirectory>,
        exams: Arc<dyn ExamDirectory>,
        scan_log: Arc<dyn ScanLogRepository>,
        config: ScanRateConfig,
    ) -> Self {
        let rate_limiter = RateLimiter::new(scan_log.clone(), config);
        Self {
            students,
            exams,
            scan_log,
            rate_limiter,
            config,
        }
    }

    /// スキャンを検証する
    ///
    /// ビジネスルール上の失敗（レート制限超過・学生不在・試験不在・未登録）は
    /// `Err` ではなく非成功アウトカムの `ValidationResult` として返る。
    ///
    /// # Arguments
    /// * `scanned_value` - スキャンされた生の値（学籍番号を期待するが保証はない）
    /// * `exam_id` - 対象試験のID
    /// * `operator` - 認証済み試験監督のユーザー名
    pub async fn validate(
        &self,
        scanned_value: &str,
        exam_id: i64,
        operator: &str,
    ) -> HallResult<ValidationResult> {
        let timestamp = Utc::now();

        // 1. レート制限チェック。拒否時はディレクトリを一切参照せず、
        //    学生・試験参照をnullのまま記録する。この記録自体も以降の
        //    ウィンドウにカウントされる（自己強化スロットル）。
        let rate = self.rate_limiter.check(operator, timestamp).await?;
        if !rate.allowed {
            let detail = format!(
                "Rate limit exceeded. Maximum {} scans per {} seconds.",
                self.config.limit, self.config.window_secs
            );
            tracing::warn!(
                operator = operator,
                current_count = rate.current_count,
                "scan rejected: rate limit exceeded"
            );
            self.log_attempt(scanned_value, None, None, operator, ScanOutcome::RateLimited, Some(&detail), timestamp)
                .await?;
            return Ok(ValidationResult {
                outcome: ScanOutcome::RateLimited,
                student: None,
                exam: None,
                detail: Some(detail),
                timestamp,
            });
        }

        // 2. 学生照合（学籍番号の完全一致）
        let student = self.students.find_by_identifier(scanned_value).await?;
        let student = match student {
            Some(student) => student,
            None => {
                let detail = format!("Student not found: {}", scanned_value);
                // 監査レコードの試験参照は「試験ID自体が解決しない場合のみnull」。
                // 学生が見つからなくても試験は記録用に解決する。
                let exam_ref = self.exams.find_by_id(exam_id).await?.map(|e| e.id);
                self.log_attempt(scanned_value, None, exam_ref, operator, ScanOutcome::StudentNotFound, Some(&detail), timestamp)
                    .await?;
                return Ok(ValidationResult {
                    outcome: ScanOutcome::StudentNotFound,
                    student: None,
                    exam: None,
                    detail: Some(detail),
                    timestamp,
                });
            }
        };

        // 3. 試験照合
        let exam = match self.exams.find_by_id(exam_id).await? {
            Some(exam) => exam,
            None => {
                let detail = "Exam not found".to_string();
                self.log_attempt(scanned_value, Some(student.id), None, operator, ScanOutcome::ExamNotFound, Some(&detail), timestamp)
                    .await?;
                return Ok(ValidationResult {
                    outcome: ScanOutcome::ExamNotFound,
                    student: Some(student),
                    exam: None,
                    detail: Some(detail),
                    timestamp,
                });
            }
        };

        // 4. 受験登録判定（名簿に対する学籍番号のメンバーシップ）
        if !exam.is_enrolled(&student.student_id) {
            let detail = format!("Student {} is not enrolled in this exam", student.full_name);
            self.log_attempt(scanned_value, Some(student.id), Some(exam.id), operator, ScanOutcome::NotEnrolled, Some(&detail), timestamp)
                .await?;
            return Ok(ValidationResult {
                outcome: ScanOutcome::NotEnrolled,
                student: Some(student),
                exam: Some(exam),
                detail: Some(detail),
                timestamp,
            });
        }

        // 5. すべてのチェックを通過
        self.log_attempt(scanned_value, Some(student.id), Some(exam.id), operator, ScanOutcome::Success, None, timestamp)
            .await?;
        tracing::info!(
            operator = operator,
            student_id = %student.student_id,
            exam_id = exam.id,
            "scan validated"
        );
        Ok(ValidationResult {
            outcome: ScanOutcome::Success,
            student: Some(student),
            exam: Some(exam),
            detail: None,
            timestamp,
        })
    }

    /// スキャン試行を監査ログに追記する
    #[allow(clippy::too_many_arguments)]
    async fn log_attempt(
        &self,
        scanned_value: &str,
        student_id: Option<i64>,
        exam_id: Option<i64>,
        operator: &str,
        outcome: ScanOutcome,
        detail: Option<&str>,
        scanned_at: DateTime<Utc>,
    ) -> HallResult<()> {
        let attempt = ScanAttempt {
            id: None,
            scanned_value: scanned_value.to_string(),
            student_id,
            exam_id,
            operator: operator.to_string(),
            outcome,
            detail: detail.map(|d| d.to_string()),
            scanned_at,
        };
        self.scan_log.append(&attempt).await?;
        Ok(())
    }

    #[cfg(test)]
    fn threshold(&self) -> i64 {
        self.config.limit
    }
}
