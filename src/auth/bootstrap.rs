//! 初回起動時の管理者アカウント作成
//!
//! 環境変数から管理者を作成する

use crate::auth::password::hash_password;
use crate::common::auth::UserRole;
use crate::common::error::HallError;
use crate::config::get_env;
use crate::db;

/// 環境変数から管理者を作成
///
/// # Environment Variables
/// * `EXAMHALL_ADMIN_USERNAME` - 管理者ユーザー名（省略時: "admin"）
/// * `EXAMHALL_ADMIN_PASSWORD` - 管理者パスワード（必須）
///
/// # Returns
/// * `Ok(Some(username))` - 管理者作成成功（ユーザー名を返す）
/// * `Ok(None)` - EXAMHALL_ADMIN_PASSWORDが未設定（作成しない）
/// * `Err(HallError)` - 作成失敗
pub async fn create_admin_from_env(pool: &sqlx::SqlitePool) -> Result<Option<String>, HallError> {
    let password = match get_env("EXAMHALL_ADMIN_PASSWORD") {
        Some(p) if !p.is_empty() => p,
        _ => {
            tracing::debug!("EXAMHALL_ADMIN_PASSWORD not set, skipping admin creation from env");
            return Ok(None);
        }
    };

    let username = get_env("EXAMHALL_ADMIN_USERNAME").unwrap_or_else(|| "admin".to_string());

    let password_hash = hash_password(&password)?;

    match db::users::create(pool, &username, &password_hash, UserRole::Admin).await {
        Ok(user) => {
            tracing::info!("Created admin user from env: username={}", username);
            Ok(Some(user.username))
        }
        Err(HallError::Database(ref e)) if e.contains("already exists") => {
            tracing::warn!("Admin user {} already exists, skipping creation", username);
            Ok(Some(username))
        }
        Err(e) => {
            tracing::error!("Failed to create admin user from env: {}", e);
            Err(e)
        }
    }
}

/// 初回起動時の管理者作成処理
///
/// 1. データベースにユーザーが存在するかチェック
/// 2. ユーザーが存在しない場合、環境変数から管理者を作成
/// 3. ユーザーが既に存在する場合はスキップ
pub async fn ensure_admin_exists(pool: &sqlx::SqlitePool) -> Result<(), HallError> {
    let is_first_boot = db::users::is_first_boot(pool).await?;
    if !is_first_boot {
        tracing::debug!("Users already exist, skipping admin creation");
        return Ok(());
    }

    tracing::info!("First boot detected, creating admin user");

    match create_admin_from_env(pool).await? {
        Some(username) => {
            tracing::info!("Admin user created from environment: {}", username);
            Ok(())
        }
        None => {
            tracing::warn!(
                "No users exist and EXAMHALL_ADMIN_PASSWORD is not set; \
                 login will be impossible until an admin is created"
            );
            Ok(())
        }
    }
}
