//! Exam invigilation backend
//!
//! 試験監督向けバックエンド。バーコードスキャン検証・監査パイプラインを中核とし、
//! 学生ディレクトリ・試験ディレクトリ・監査ログストレージの上で動作する。

#![warn(missing_docs)]

/// 共通型定義（エラー、認証、ドメイン型）
pub mod common;

/// REST APIハンドラー
pub mod api;

/// 認証・認可機能
pub mod auth;

/// データベースアクセス
pub mod db;

/// スキャン検証パイプライン（レート制限・バリデータ・統計）
pub mod scan;

/// 設定管理（環境変数ヘルパー）
pub mod config;

/// ロギング初期化ユーティリティ
pub mod logging;

/// axumサーバー起動・シャットダウン
pub mod server;

use std::sync::Arc;

use db::scan_log::ScanLogStorage;
use db::traits::{ExamDirectory, ScanLogRepository, StudentDirectory};
use db::{exams::SqliteExamDirectory, students::SqliteStudentDirectory};
use scan::validator::ScanValidator;

/// アプリケーション状態
#[derive(Clone)]
pub struct AppState {
    /// データベース接続プール
    pub db_pool: sqlx::SqlitePool,
    /// JWT秘密鍵
    pub jwt_secret: String,
    /// スキャンレート制限設定
    pub scan_config: config::ScanRateConfig,
    /// スキャン検証パイプライン
    pub validator: ScanValidator,
    /// 監査ログストレージ
    pub scan_log: Arc<dyn ScanLogRepository>,
}

impl AppState {
    /// プールと設定からアプリケーション状態を構築する
    pub fn new(
        db_pool: sqlx::SqlitePool,
        jwt_secret: String,
        scan_config: config::ScanRateConfig,
    ) -> Self {
        let students: Arc<dyn StudentDirectory> =
            Arc::new(SqliteStudentDirectory::new(db_pool.clone()));
        let exams: Arc<dyn ExamDirectory> = Arc::new(SqliteExamDirectory::new(db_pool.clone()));
        let scan_log: Arc<dyn ScanLogRepository> =
            Arc::new(ScanLogStorage::new(db_pool.clone()));
        let validator = ScanValidator::new(students, exams, scan_log.clone(), scan_config);

        Self {
            db_pool,
            jwt_secret,
            scan_config,
            validator,
            scan_log,
        }
    }
}
