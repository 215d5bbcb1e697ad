//! パスワードハッシュ化と検証（bcrypt実装）

use crate::common::error::HallError;
use bcrypt::{hash, verify};

/// パスワードハッシュ化のコスト（12推奨、200-300ms）
const HASH_COST: u32 = 12;

/// パスワードをbcryptでハッシュ化
///
/// # Returns
/// * `Ok(String)` - bcryptハッシュ文字列（$2b$で始まる）
/// * `Err(HallError)` - ハッシュ化失敗
pub fn hash_password(password: &str) -> Result<String, HallError> {
    hash(password, HASH_COST)
        .map_err(|e| HallError::PasswordHash(format!("Failed to hash password: {}", e)))
}

/// パスワードを検証
///
/// # Returns
/// * `Ok(true)` - パスワード一致
/// * `Ok(false)` - パスワード不一致
/// * `Err(HallError)` - 検証失敗
pub fn verify_password(password: &str, hash: &str) -> Result<bool, HallError> {
    verify(password, hash)
        .map_err(|e| HallError::PasswordHash(format!("Failed to verify password: {}", e)))
}
