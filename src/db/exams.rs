//! 試験ディレクトリ（受験登録名簿を含む）
//!
//! 試験の解決時に受験登録名簿（学籍番号の集合）を実体化する。
//! 在籍判定は名簿に対するメンバーシップテストで行われる。

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::SqlitePool;

use crate::common::error::{HallError, HallResult};
use crate::common::types::Exam;
use crate::db::traits::ExamDirectory;

/// sqlx::FromRow用の行構造体
#[derive(Debug, sqlx::FromRow)]
struct ExamRow {
    id: i64,
    course_code: String,
    title: String,
    exam_date: String,
    location: Option<String>,
}

impl ExamRow {
    fn into_exam(self, roster: Vec<String>) -> Result<Exam, HallError> {
        let exam_date = chrono::DateTime::parse_from_rfc3339(&self.exam_date)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| HallError::Database(format!("Failed to parse exam_date: {}", e)))?;

        Ok(Exam {
            id: self.id,
            course_code: self.course_code,
            title: self.title,
            exam_date,
            location: self.location,
            roster,
        })
    }
}

/// 試験を作成
pub async fn create(
    pool: &SqlitePool,
    course_code: &str,
    title: &str,
    exam_date: DateTime<Utc>,
    location: Option<&str>,
) -> HallResult<Exam> {
    let result = sqlx::query(
        "INSERT INTO exams (course_code, title, exam_date, location) VALUES (?, ?, ?, ?)",
    )
    .bind(course_code)
    .bind(title)
    .bind(exam_date.to_rfc3339_opts(SecondsFormat::Micros, true))
    .bind(location)
    .execute(pool)
    .await
    .map_err(|e| HallError::Database(format!("Failed to create exam: {}", e)))?;

    Ok(Exam {
        id: result.last_insert_rowid(),
        course_code: course_code.to_string(),
        title: title.to_string(),
        exam_date,
        location: location.map(|l| l.to_string()),
        roster: Vec::new(),
    })
}

/// 試験をIDで解決する（受験登録名簿も読み込む）
pub async fn find_by_id(pool: &SqlitePool, exam_id: i64) -> HallResult<Option<Exam>> {
    let row = sqlx::query_as::<_, ExamRow>(
        "SELECT id, course_code, title, exam_date, location FROM exams WHERE id = ?",
    )
    .bind(exam_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| HallError::Database(format!("Failed to find exam: {}", e)))?;

    let row = match row {
        Some(row) => row,
        None => return Ok(None),
    };

    let roster: Vec<String> = sqlx::query_scalar(
        "SELECT s.student_id FROM exam_enrollments e
         JOIN students s ON s.id = e.student_id
         WHERE e.exam_id = ? ORDER BY s.student_id",
    )
    .bind(exam_id)
    .fetch_all(pool)
    .await
    .map_err(|e| HallError::Database(format!("Failed to load exam roster: {}", e)))?;

    row.into_exam(roster).map(Some)
}

/// 学生を試験に受験登録する
pub async fn enroll(pool: &SqlitePool, exam_id: i64, student_row_id: i64) -> HallResult<()> {
    sqlx::query("INSERT OR IGNORE INTO exam_enrollments (exam_id, student_id) VALUES (?, ?)")
        .bind(exam_id)
        .bind(student_row_id)
        .execute(pool)
        .await
        .map_err(|e| HallError::Database(format!("Failed to enroll student: {}", e)))?;

    Ok(())
}

/// SQLiteベースの試験ディレクトリ実装
#[derive(Clone)]
pub struct SqliteExamDirectory {
    pool: SqlitePool,
}

impl SqliteExamDirectory {
    /// 新しいSqliteExamDirectoryを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExamDirectory for SqliteExamDirectory {
    async fn find_by_id(&self, exam_id: i64) -> HallResult<Option<Exam>> {
        find_by_id(&self.pool, exam_id).await
    }
}
