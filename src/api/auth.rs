//! 認証API
//!
//! ログインと認証情報確認

use crate::common::auth::Claims;
use crate::common::error::HallError;
use crate::AppState;
use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};

use super::error::AppError;

/// JWT有効期限（秒）
const TOKEN_EXPIRES_IN: usize = 86400;

/// ログインリクエスト
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// ユーザー名
    pub username: String,
    /// パスワード
    pub password: String,
}

/// ログインレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    /// JWTトークン
    pub token: String,
    /// トークン有効期限（秒）
    pub expires_in: usize,
    /// ユーザー情報
    pub user: UserInfo,
}

/// ユーザー情報（ログインレスポンス用）
#[derive(Debug, Serialize, Deserialize)]
pub struct UserInfo {
    /// ユーザーID
    pub id: String,
    /// ユーザー名
    pub username: String,
    /// ロール
    pub role: String,
}

/// 認証情報レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct MeResponse {
    /// ユーザーID
    pub user_id: String,
    /// ユーザー名
    pub username: String,
    /// ロール
    pub role: String,
}

/// POST /api/auth/login - ログイン
///
/// ユーザー名とパスワードで認証し、JWTトークンを発行する。
/// トークンのusernameクレームがスキャン監査上のオペレーター識別子になる。
///
/// # Returns
/// * `200 OK` - ログイン成功（JWT token）
/// * `401 Unauthorized` - 認証失敗
pub async fn login(
    State(app_state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let user = crate::db::users::find_by_username(&app_state.db_pool, &request.username)
        .await?
        .ok_or_else(|| {
            HallError::Authentication("Invalid username or password".to_string())
        })?;

    let is_valid =
        crate::auth::password::verify_password(&request.password, &user.password_hash)?;

    if !is_valid {
        return Err(AppError(HallError::Authentication(
            "Invalid username or password".to_string(),
        )));
    }

    if let Err(e) = crate::db::users::update_last_login(&app_state.db_pool, user.id).await {
        // エラーだがログイン自体は成功させる
        tracing::warn!("Failed to update last login: {}", e);
    }

    let token = crate::auth::jwt::create_jwt(
        &user.id.to_string(),
        &user.username,
        user.role,
        &app_state.jwt_secret,
    )?;

    tracing::info!(username = %user.username, role = %user.role.as_str(), "login succeeded");

    Ok(Json(LoginResponse {
        token,
        expires_in: TOKEN_EXPIRES_IN,
        user: UserInfo {
            id: user.id.to_string(),
            username: user.username,
            role: user.role.as_str().to_string(),
        },
    }))
}

/// GET /api/auth/me - 認証情報確認
pub async fn me(Extension(claims): Extension<Claims>) -> Json<MeResponse> {
    Json(MeResponse {
        user_id: claims.sub,
        username: claims.username,
        role: claims.role.as_str().to_string(),
    })
}
