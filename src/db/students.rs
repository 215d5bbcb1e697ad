//! 学生ディレクトリ
//!
//! スキャン検証パイプラインから見ると外部コラボレーター。学籍番号の
//! 完全一致によるルックアップが中心で、CRUDの表面は最小限に留める。

use async_trait::async_trait;
use sqlx::SqlitePool;

use crate::common::error::{HallError, HallResult};
use crate::common::types::Student;
use crate::db::traits::StudentDirectory;

/// sqlx::FromRow用の行構造体
#[derive(Debug, sqlx::FromRow)]
struct StudentRow {
    id: i64,
    student_id: String,
    full_name: String,
    program: String,
    email: Option<String>,
}

impl From<StudentRow> for Student {
    fn from(row: StudentRow) -> Self {
        Student {
            id: row.id,
            student_id: row.student_id,
            full_name: row.full_name,
            program: row.program,
            email: row.email,
        }
    }
}

/// 学生を作成
///
/// # Returns
/// * `Ok(Student)` - 作成された学生
/// * `Err(HallError)` - 作成失敗（学籍番号重複など）
pub async fn create(
    pool: &SqlitePool,
    student_id: &str,
    full_name: &str,
    program: &str,
    email: Option<&str>,
) -> HallResult<Student> {
    let result = sqlx::query(
        "INSERT INTO students (student_id, full_name, program, email) VALUES (?, ?, ?, ?)",
    )
    .bind(student_id)
    .bind(full_name)
    .bind(program)
    .bind(email)
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            HallError::Database(format!("Student '{}' already exists", student_id))
        } else {
            HallError::Database(format!("Failed to create student: {}", e))
        }
    })?;

    Ok(Student {
        id: result.last_insert_rowid(),
        student_id: student_id.to_string(),
        full_name: full_name.to_string(),
        program: program.to_string(),
        email: email.map(|e| e.to_string()),
    })
}

/// 学籍番号で学生を検索
pub async fn find_by_student_id(
    pool: &SqlitePool,
    student_id: &str,
) -> HallResult<Option<Student>> {
    let row = sqlx::query_as::<_, StudentRow>(
        "SELECT id, student_id, full_name, program, email FROM students WHERE student_id = ?",
    )
    .bind(student_id)
    .fetch_optional(pool)
    .await
    .map_err(|e| HallError::Database(format!("Failed to find student: {}", e)))?;

    Ok(row.map(Student::from))
}

/// すべての学生を取得（IDカード発行用）
pub async fn list(pool: &SqlitePool) -> HallResult<Vec<Student>> {
    let rows = sqlx::query_as::<_, StudentRow>(
        "SELECT id, student_id, full_name, program, email FROM students ORDER BY student_id",
    )
    .fetch_all(pool)
    .await
    .map_err(|e| HallError::Database(format!("Failed to list students: {}", e)))?;

    Ok(rows.into_iter().map(Student::from).collect())
}

/// 学籍番号または氏名（部分一致、大文字小文字無視）で学生を検索
pub async fn search(pool: &SqlitePool, query: &str) -> HallResult<Vec<Student>> {
    // 学籍番号の完全一致を優先する
    if let Some(student) = find_by_student_id(pool, query).await? {
        return Ok(vec![student]);
    }

    let pattern = format!("%{}%", query);
    let rows = sqlx::query_as::<_, StudentRow>(
        "SELECT id, student_id, full_name, program, email FROM students
         WHERE full_name LIKE ? COLLATE NOCASE ORDER BY student_id",
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await
    .map_err(|e| HallError::Database(format!("Failed to search students: {}", e)))?;

    Ok(rows.into_iter().map(Student::from).collect())
}

/// SQLiteベースの学生ディレクトリ実装
#[derive(Clone)]
pub struct SqliteStudentDirectory {
    pool: SqlitePool,
}

impl SqliteStudentDirectory {
    /// 新しいSqliteStudentDirectoryを作成
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StudentDirectory for SqliteStudentDirectory {
    async fn find_by_identifier(&self, student_identifier: &str) -> HallResult<Option<Student>> {
        find_by_student_id(&self.pool, student_identifier).await
    }
}
