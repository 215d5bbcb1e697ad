//! 認証関連のデータモデル

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::common::error::HallError;

/// ユーザーロール
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// 管理者（セキュリティレビュー・全操作可能）
    Admin,
    /// 試験監督（スキャン・出席確認）
    Invigilator,
}

impl UserRole {
    /// DB格納用の文字列表現
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::Admin => "admin",
            UserRole::Invigilator => "invigilator",
        }
    }

}

impl std::str::FromStr for UserRole {
    type Err = HallError;

    /// DB格納文字列からの復元
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(UserRole::Admin),
            "invigilator" => Ok(UserRole::Invigilator),
            _ => Err(HallError::Validation(format!("Unknown user role: {}", s))),
        }
    }
}

/// ユーザー（試験監督アカウント）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// ユーザーID
    pub id: Uuid,
    /// ユーザー名
    pub username: String,
    /// パスワードハッシュ（bcrypt）
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// ユーザーロール
    pub role: UserRole,
    /// 作成日時
    pub created_at: DateTime<Utc>,
    /// 最終ログイン日時
    pub last_login: Option<DateTime<Utc>>,
}

/// JWTクレーム
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// ユーザーID（JWT sub claim）
    pub sub: String,
    /// ユーザー名（スキャン監査上のオペレーター識別子）
    pub username: String,
    /// ユーザーロール
    pub role: UserRole,
    /// 有効期限（Unix timestamp、JWT exp claim）
    pub exp: usize,
}
