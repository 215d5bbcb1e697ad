//! ドメイン型（学生・試験）
//!
//! 学生・試験ディレクトリが返すエンティティ。スキャン検証パイプラインは
//! これらを読み取り専用のコラボレーターとして扱う。

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 学生
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Student {
    /// 行ID
    pub id: i64,
    /// 学籍番号（バーコードのペイロードそのもの、例: "BCS25165336"）
    pub student_id: String,
    /// 氏名
    pub full_name: String,
    /// 所属プログラム
    pub program: String,
    /// メールアドレス
    pub email: Option<String>,
}

/// 試験
///
/// 解決時に受験登録名簿（roster）を学籍番号の集合として実体化する。
/// 在籍判定は学籍番号の等価比較で行う。オブジェクト参照の同一性には
/// 依存しない（学生が別のルックアップ経由で解決されるため）。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Exam {
    /// 行ID
    pub id: i64,
    /// コースコード
    pub course_code: String,
    /// 試験名
    pub title: String,
    /// 実施日時
    pub exam_date: DateTime<Utc>,
    /// 実施場所
    pub location: Option<String>,
    /// 受験登録済み学籍番号の名簿
    pub roster: Vec<String>,
}

impl Exam {
    /// 指定した学籍番号がこの試験に登録されているか
    pub fn is_enrolled(&self, student_identifier: &str) -> bool {
        self.roster.iter().any(|s| s == student_identifier)
    }
}
