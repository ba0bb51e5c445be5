//! # Notifier エラー定義
//!
//! 起動時の設定読み込みで発生するエラーを定義する。
//! 通知処理中のエラーはドメイン層の `NotificationError` を使う。

use thiserror::Error;

/// 設定エラー
#[derive(Debug, Error)]
pub enum ConfigError {
    /// 値の形式が不正
    #[error("{name} の値が不正です: {value:?}（{reason}）")]
    InvalidValue {
        name:   &'static str,
        value:  String,
        reason: String,
    },

    /// 翻訳カタログの読み込みに失敗
    #[error("翻訳カタログの読み込みに失敗: {path}: {reason}")]
    Translations { path: String, reason: String },
}
