//! エラー型

use thiserror::Error;

/// 設定エラー（起動時に検出、リトライなし）
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("GAS URL が未設定です（GAS_URL を設定してください）")]
    MissingEndpoint,
    #[error("GAS URL が不正です: {0}")]
    InvalidEndpoint(String),
}

/// リモート取得エラー
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("HTTP {0}")]
    RequestFailed(u16),
    #[error("タイムアウトしました")]
    Timeout,
    #[error("通信に失敗しました: {0}")]
    Network(String),
    /// 破棄・差し替えによる中断。ユーザーには表示しない
    #[error("中断されました")]
    Aborted,
}

/// ブラウザストレージのエラー。呼び出し側で握りつぶす前提
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StorageError {
    #[error("ストレージが利用できません")]
    Unavailable,
    #[error("ストレージ操作に失敗しました: {0}")]
    Access(String),
}
