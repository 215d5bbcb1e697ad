//! 共通レイヤー
//!
//! エラー型・認証データモデル・ドメイン型

/// エラー型定義
pub mod error;

/// 認証関連のデータモデル
pub mod auth;

/// ドメイン型（学生・試験）
pub mod types;
