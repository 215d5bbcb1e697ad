//! スキャン検証API
//!
//! `/api/barcode` 系のエンドポイント。検証の本体は
//! [`crate::scan::validator::ScanValidator`] にあり、ここではHTTP表現への
//! 変換のみを行う。

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use crate::common::auth::Claims;
use crate::scan::stats::{stats_for, validate_window_hours};
use crate::scan::types::{ScanAttempt, ScanStatistics, ValidationResult};
use crate::AppState;

/// スキャン検証リクエスト
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateScanRequest {
    /// スキャンされた生の値
    pub scanned_barcode: String,
    /// 対象試験のID
    pub exam_id: i64,
}

/// スキャン検証レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateScanResponse {
    /// すべてのチェックを通過したか
    pub success: bool,
    /// 終端アウトカム（SUCCESS / RATE_LIMITED / ...）
    pub outcome: String,
    /// 結果の説明
    pub message: String,
    /// 解決された学生の氏名
    pub student_name: Option<String>,
    /// 解決された学生の学籍番号
    pub student_id: Option<String>,
    /// 解決された試験のID
    pub exam_id: Option<i64>,
    /// 検証時刻
    pub timestamp: DateTime<Utc>,
}

impl From<ValidationResult> for ValidateScanResponse {
    fn from(result: ValidationResult) -> Self {
        let message = result
            .detail
            .clone()
            .unwrap_or_else(|| "Scan validated successfully".to_string());

        Self {
            success: result.is_success(),
            outcome: result.outcome.as_str().to_string(),
            message,
            student_name: result.student.as_ref().map(|s| s.full_name.clone()),
            student_id: result.student.as_ref().map(|s| s.student_id.clone()),
            exam_id: result.exam.as_ref().map(|e| e.id),
            timestamp: result.timestamp,
        }
    }
}

/// 監査レコードレスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanRecordResponse {
    /// 行ID
    pub id: Option<i64>,
    /// スキャンされた生の値
    pub scanned_value: String,
    /// 解決された学生の行ID
    pub student_id: Option<i64>,
    /// 解決された試験の行ID
    pub exam_id: Option<i64>,
    /// スキャンを行った試験監督のユーザー名
    pub operator: String,
    /// 検証アウトカム
    pub outcome: String,
    /// 失敗時の補足説明
    pub detail: Option<String>,
    /// スキャン時刻
    pub scanned_at: DateTime<Utc>,
}

impl From<ScanAttempt> for ScanRecordResponse {
    fn from(attempt: ScanAttempt) -> Self {
        Self {
            id: attempt.id,
            scanned_value: attempt.scanned_value,
            student_id: attempt.student_id,
            exam_id: attempt.exam_id,
            operator: attempt.operator,
            outcome: attempt.outcome.as_str().to_string(),
            detail: attempt.detail,
            scanned_at: attempt.scanned_at,
        }
    }
}

/// スキャン統計レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatsResponse {
    /// オペレーター（試験監督のユーザー名）
    pub operator: String,
    /// 集計ウィンドウ内の総スキャン数
    pub total_scans: i64,
    /// 設定されているレート制限しきい値
    pub limit_threshold: i64,
}

impl From<ScanStatistics> for ScanStatsResponse {
    fn from(stats: ScanStatistics) -> Self {
        Self {
            operator: stats.operator,
            total_scans: stats.total_scans,
            limit_threshold: stats.limit_threshold,
        }
    }
}

/// 統計取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct StatsQueryParams {
    /// 集計ウィンドウ（時間、デフォルト: 24）
    pub window_hours: Option<i64>,
}

/// 失敗一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct FailuresQueryParams {
    /// 遡る時間数（デフォルト: 24）
    pub since_hours: Option<i64>,
}

/// POST /api/barcode/validate - バーコードスキャン検証
///
/// 認証済みオペレーターとしてスキャンを検証する。ビジネスルール上の
/// 失敗（レート制限・学生不在・試験不在・未登録）は403で構造化された
/// 理由を返す。500になるのはインフラ障害のみ。
///
/// # Returns
/// * `200 OK` - 検証成功
/// * `403 Forbidden` - ビジネスルール上の失敗（レスポンス構造は200と同一）
pub async fn validate_scan(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(request): Json<ValidateScanRequest>,
) -> Result<Response, AppError> {
    let result = state
        .validator
        .validate(&request.scanned_barcode, request.exam_id, &claims.username)
        .await?;

    let status = if result.is_success() {
        StatusCode::OK
    } else {
        StatusCode::FORBIDDEN
    };
    let response = ValidateScanResponse::from(result);

    Ok((status, Json(response)).into_response())
}

/// GET /api/barcode/stats - オペレーター別スキャン統計
///
/// 認証済みオペレーター自身の統計を返す。
pub async fn get_scan_stats(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(params): Query<StatsQueryParams>,
) -> Result<Json<ScanStatsResponse>, AppError> {
    let window_hours = params.window_hours.unwrap_or(24);
    let stats = stats_for(
        state.scan_log.as_ref(),
        &state.scan_config,
        &claims.username,
        window_hours,
    )
    .await?;

    Ok(Json(stats.into()))
}

/// GET /api/barcode/failures - 直近の失敗スキャン一覧（管理者のみ）
///
/// セキュリティレビュー用。新しい順に返す。
pub async fn list_recent_failures(
    State(state): State<AppState>,
    Query(params): Query<FailuresQueryParams>,
) -> Result<Json<Vec<ScanRecordResponse>>, AppError> {
    let since_hours = params.since_hours.unwrap_or(24);
    validate_window_hours(since_hours)?;
    let since = Utc::now() - Duration::hours(since_hours);
    let failures = state.scan_log.recent_failures(since).await?;

    Ok(Json(
        failures.into_iter().map(ScanRecordResponse::from).collect(),
    ))
}

/// GET /api/barcode/scans/{exam_id} - 試験単位の監査履歴（管理者のみ）
pub async fn list_scans_by_exam(
    State(state): State<AppState>,
    Path(exam_id): Path<i64>,
) -> Result<Json<Vec<ScanRecordResponse>>, AppError> {
    let scans = state.scan_log.find_by_exam(exam_id).await?;

    Ok(Json(
        scans.into_iter().map(ScanRecordResponse::from).collect(),
    ))
}
