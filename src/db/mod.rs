//! データベースアクセス層
//!
//! SQLiteベースのデータ永続化

/// 学生ディレクトリ
pub mod students;

/// 試験ディレクトリ（受験登録名簿を含む）
pub mod exams;

/// ユーザー管理（試験監督アカウント）
pub mod users;

/// スキャン監査ログストレージ
pub mod scan_log;

/// データベースマイグレーション
pub mod migrations;

/// Repository traitパターン（テスタビリティ向上）
pub mod traits;
