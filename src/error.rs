//! エラー型定義モジュール

use std::io;
use thiserror::Error;

/// 設定エラー
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IOエラー: {0}")]
    IoError(#[from] io::Error),

    #[error("TOML解析エラー: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("不正な設定値: {0}")]
    InvalidValue(String),

    #[error("ホームディレクトリが見つかりません")]
    HomeNotFound,
}

/// 台帳ファイルエラー
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IOエラー: {0}")]
    IoError(#[from] io::Error),

    #[error("ディレクトリ作成エラー: {0}")]
    DirectoryCreationError(io::Error),

    #[error("JSON解析エラー: {0}")]
    DecodeError(serde_json::Error),

    #[error("JSON出力エラー: {0}")]
    EncodeError(serde_json::Error),
}

/// 台帳操作エラー
#[derive(Error, Debug, PartialEq, Eq)]
pub enum LedgerError {
    #[error("タスク '{0}' が見つかりません")]
    TaskNotFound(String),

    #[error("実行中のタスクはありません")]
    NoCurrentTask,

    #[error("タスク '{0}' は一時停止していません")]
    NotPaused(String),

    #[error("タスク '{0}' は完了済みです")]
    TaskDone(String),
}

impl LedgerError {
    /// 状態遷移の誤りかどうか（タスク不在以外）
    pub fn is_invalid_transition(&self) -> bool {
        !matches!(self, LedgerError::TaskNotFound(_))
    }
}

/// Gitフック導入エラー
#[derive(Error, Debug)]
pub enum HookError {
    #[error("フック書き込み失敗: {0}")]
    WriteFailed(#[from] io::Error),
}
