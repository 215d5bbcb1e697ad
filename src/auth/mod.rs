//! 認証・認可モジュール

/// パスワードハッシュ化・検証（bcrypt）
pub mod password;

/// JWT生成・検証（jsonwebtoken）
pub mod jwt;

/// 認証ミドルウェア（JWT Bearer）
pub mod middleware;

/// 初回起動時の管理者アカウント作成
pub mod bootstrap;
