//! Contract test用の共通ユーティリティ

use axum::Router;
use chrono::Utc;
use examhall::common::auth::UserRole;
use examhall::common::types::{Exam, Student};
use examhall::config::ScanRateConfig;
use examhall::AppState;
use sqlx::SqlitePool;

/// テスト用のJWTシークレット
pub const TEST_JWT_SECRET: &str = "contract-test-secret";

/// テスト用アプリを構築する（インメモリSQLite）
pub async fn create_test_app() -> (Router, SqlitePool) {
    create_test_app_with_config(ScanRateConfig::default()).await
}

/// レート制限設定を指定してテスト用アプリを構築する
pub async fn create_test_app_with_config(config: ScanRateConfig) -> (Router, SqlitePool) {
    let pool = SqlitePool::connect("sqlite::memory:")
        .await
        .expect("Failed to create test database");
    examhall::db::migrations::run_migrations(&pool)
        .await
        .expect("Failed to run migrations");

    let state = AppState::new(pool.clone(), TEST_JWT_SECRET.to_string(), config);
    (examhall::api::create_app(state), pool)
}

/// ユーザーを作成する
pub async fn seed_user(pool: &SqlitePool, username: &str, password: &str, role: UserRole) {
    let hash = examhall::auth::password::hash_password(password).expect("hash password");
    examhall::db::users::create(pool, username, &hash, role)
        .await
        .expect("create user");
}

/// 学生を作成する
pub async fn seed_student(pool: &SqlitePool, student_id: &str, full_name: &str) -> Student {
    examhall::db::students::create(pool, student_id, full_name, "BCS", None)
        .await
        .expect("create student")
}

/// 試験を作成し、指定の学生を受験登録する
pub async fn seed_exam_with_roster(pool: &SqlitePool, roster: &[&Student]) -> Exam {
    let exam = examhall::db::exams::create(pool, "CS101", "Final Exam", Utc::now(), Some("Hall A"))
        .await
        .expect("create exam");
    for student in roster {
        examhall::db::exams::enroll(pool, exam.id, student.id)
            .await
            .expect("enroll student");
    }
    exam
}
