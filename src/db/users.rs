//! ユーザーCRUD操作（試験監督・管理者アカウント）

use crate::common::auth::{User, UserRole};
use crate::common::error::HallError;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;

/// ユーザーを作成
///
/// # Arguments
/// * `pool` - データベース接続プール
/// * `username` - ユーザー名
/// * `password_hash` - bcryptハッシュ化されたパスワード
/// * `role` - ユーザーロール
///
/// # Returns
/// * `Ok(User)` - 作成されたユーザー
/// * `Err(HallError)` - 作成失敗（ユーザー名重複など）
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    password_hash: &str,
    role: UserRole,
) -> Result<User, HallError> {
    let id = Uuid::new_v4();
    let created_at = Utc::now();

    sqlx::query(
        "INSERT INTO users (id, username, password_hash, role, created_at, last_login)
         VALUES (?, ?, ?, ?, ?, NULL)",
    )
    .bind(id.to_string())
    .bind(username)
    .bind(password_hash)
    .bind(role.as_str())
    .bind(created_at.to_rfc3339())
    .execute(pool)
    .await
    .map_err(|e| {
        if e.to_string().contains("UNIQUE constraint failed") {
            HallError::Database(format!("Username '{}' already exists", username))
        } else {
            HallError::Database(format!("Failed to create user: {}", e))
        }
    })?;

    Ok(User {
        id,
        username: username.to_string(),
        password_hash: password_hash.to_string(),
        role,
        created_at,
        last_login: None,
    })
}

/// ユーザー名でユーザーを検索
pub async fn find_by_username(
    pool: &SqlitePool,
    username: &str,
) -> Result<Option<User>, HallError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, role, created_at, last_login
         FROM users WHERE username = ?",
    )
    .bind(username)
    .fetch_optional(pool)
    .await
    .map_err(|e| HallError::Database(format!("Failed to find user: {}", e)))?;

    row.map(UserRow::into_user).transpose()
}

/// IDでユーザーを検索
pub async fn find_by_id(pool: &SqlitePool, id: Uuid) -> Result<Option<User>, HallError> {
    let row = sqlx::query_as::<_, UserRow>(
        "SELECT id, username, password_hash, role, created_at, last_login
         FROM users WHERE id = ?",
    )
    .bind(id.to_string())
    .fetch_optional(pool)
    .await
    .map_err(|e| HallError::Database(format!("Failed to find user: {}", e)))?;

    row.map(UserRow::into_user).transpose()
}

/// 最終ログイン日時を更新
pub async fn update_last_login(pool: &SqlitePool, id: Uuid) -> Result<(), HallError> {
    let now = Utc::now();

    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(now.to_rfc3339())
        .bind(id.to_string())
        .execute(pool)
        .await
        .map_err(|e| HallError::Database(format!("Failed to update last login: {}", e)))?;

    Ok(())
}

/// 初回起動チェック（ユーザーが0人かどうか）
pub async fn is_first_boot(pool: &SqlitePool) -> Result<bool, HallError> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await
        .map_err(|e| HallError::Database(format!("Failed to check first boot: {}", e)))?;

    Ok(count == 0)
}

// SQLiteからの行取得用の内部型
#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    username: String,
    password_hash: String,
    role: String,
    created_at: String,
    last_login: Option<String>,
}

impl UserRow {
    fn into_user(self) -> Result<User, HallError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| HallError::Database(format!("Invalid user id: {}", e)))?;
        let role = self
            .role
            .parse::<UserRole>()
            .map_err(|_| HallError::Database(format!("Unknown user role: {}", self.role)))?;
        let created_at = DateTime::parse_from_rfc3339(&self.created_at)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| HallError::Database(format!("Failed to parse created_at: {}", e)))?;
        let last_login = self.last_login.as_ref().and_then(|s| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        });

        Ok(User {
            id,
            username: self.username,
            password_hash: self.password_hash,
            role,
            created_at,
            last_login,
        })
    }
}
