//! JWT生成と検証（jsonwebtoken実装）

use crate::common::auth::{Claims, UserRole};
use crate::common::error::HallError;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};

/// JWT有効期限（24時間）
const JWT_EXPIRATION_HOURS: i64 = 24;

/// JWTトークンを生成
///
/// # Arguments
/// * `user_id` - ユーザーID
/// * `username` - ユーザー名（スキャン監査上のオペレーター識別子）
/// * `role` - ユーザーロール
/// * `secret` - JWTシークレットキー
///
/// # Returns
/// * `Ok(String)` - JWTトークン（3つのドット区切り部分）
/// * `Err(HallError)` - 生成失敗
pub fn create_jwt(
    user_id: &str,
    username: &str,
    role: UserRole,
    secret: &str,
) -> Result<String, HallError> {
    let expiration = Utc::now()
        .checked_add_signed(chrono::Duration::hours(JWT_EXPIRATION_HOURS))
        .ok_or_else(|| HallError::Jwt("Failed to calculate expiration time".to_string()))?
        .timestamp() as usize;

    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role,
        exp: expiration,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| HallError::Jwt(format!("Failed to create JWT: {}", e)))
}

/// JWTトークンを検証
///
/// # Returns
/// * `Ok(Claims)` - 検証済みクレーム
/// * `Err(HallError)` - 検証失敗（無効なトークン、期限切れなど）
pub fn verify_jwt(token: &str, secret: &str) -> Result<Claims, HallError> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| HallError::Jwt(format!("Failed to verify JWT: {}", e)))
}
