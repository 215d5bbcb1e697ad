//! IDカード発行API
//!
//! スキャン対象となるバーコードのテキストペイロード（学籍番号そのもの）を
//! 返す。画像レンダリングは行わない。

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::AppError;
use crate::common::types::Student;
use crate::AppState;

/// IDカードデータ
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdCard {
    /// 学籍番号
    pub student_id: String,
    /// 氏名
    pub full_name: String,
    /// 所属プログラム
    pub program: String,
    /// バーコードペイロード（学籍番号の平文）
    pub barcode_payload: String,
}

impl From<Student> for IdCard {
    fn from(student: Student) -> Self {
        Self {
            barcode_payload: student.student_id.clone(),
            student_id: student.student_id,
            full_name: student.full_name,
            program: student.program,
        }
    }
}

/// 検索クエリパラメータ
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// 学籍番号（完全一致）または氏名（部分一致）
    pub query: String,
}

/// GET /api/barcode/id-cards - 全学生のIDカードデータ
pub async fn list_id_cards(State(state): State<AppState>) -> Result<Json<Vec<IdCard>>, AppError> {
    let students = crate::db::students::list(&state.db_pool).await?;

    Ok(Json(students.into_iter().map(IdCard::from).collect()))
}

/// GET /api/barcode/id-cards/search?query= - IDカードデータ検索
pub async fn search_id_cards(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<IdCard>>, AppError> {
    let students = crate::db::students::search(&state.db_pool, &params.query).await?;

    Ok(Json(students.into_iter().map(IdCard::from).collect()))
}
