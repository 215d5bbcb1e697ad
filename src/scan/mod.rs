//! スキャン検証パイプライン
//!
//! バーコードスキャンの検証を行う中核モジュール。チェックは固定順の
//! パイプラインとして実行される:
//!
//! 1. レート制限（監査ログのローリングウィンドウ集計）
//! 2. 学生ディレクトリ照合
//! 3. 試験ディレクトリ照合
//! 4. 受験登録（名簿メンバーシップ）判定
//!
//! レート制限をディレクトリ照合より先に置くのはセキュリティ特性であり、
//! 入力の有効性に関わらずスロットルを一様に適用するため。順序を
//! 変更してはならない。

/// スキャン関連の型定義
pub mod types;

/// レート制限（スライディングウィンドウ）
pub mod rate_limit;

/// スキャンバリデータ（ステートマシン本体）
pub mod validator;

/// オペレーター別統計レポーター
pub mod stats;
