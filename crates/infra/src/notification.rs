//! # 通知送信
//!
//! メール通知の送信を担当するインフラストラクチャモジュール。
//!
//! ## 設計方針
//!
//! - **trait による抽象化**: `NotificationSender` trait でメール送信を抽象化
//! - **3 つの実装**: SMTP（Mailpit 開発用）、SES（本番用）、Noop（通知無効化時）
//! - **環境変数切替**: `NOTIFICATION_BACKEND` でランタイム選択（notifier 側）
//! - **結果は呼び出し元へ**: 送信失敗はリトライせず、そのまま返す

mod noop;
mod ses;
mod smtp;

use async_trait::async_trait;
pub use noop::NoopNotificationSender;
pub use ses::SesNotificationSender;
pub use smtp::SmtpNotificationSender;
use taskboard_domain::notification::{EmailMessage, NotificationError};

/// メール送信トレイト
///
/// 通知基盤の中核。メール送信の具体的な方法を抽象化する。
/// SMTP / SES / Noop の 3 実装を環境変数で切り替える。
#[async_trait]
pub trait NotificationSender: Send + Sync {
    /// メールを送信する
    async fn send_email(&self, email: &EmailMessage) -> Result<(), NotificationError>;
}

/// 宛先を `"表示名 <アドレス>"` 形式で返す
///
/// 表示名が空の場合はアドレスのみ。表示名は引用符で囲み、`"` と `\` をエスケープする。
pub(crate) fn format_recipient(email: &EmailMessage) -> String {
    if email.to_name.is_empty() {
        return email.to.clone();
    }

    let escaped = email.to_name.replace('\\', "\\\\").replace('"', "\\\"");
    format!("\"{escaped}\" <{}>", email.to)
}
