//! # Taskboard インフラ層
//!
//! メール送信など外部システムとの通信を担当するインフラストラクチャ層。
//!
//! ## 設計方針
//!
//! 外部システムの詳細をカプセル化し、通知ユースケースをトランスポートの変更から保護する。
//! ユースケースは [`notification::NotificationSender`] トレイトだけに依存する。
//!
//! ## 依存関係
//!
//! ```text
//! notifier → infra → domain
//! ```
//!
//! ## モジュール構成
//!
//! - [`notification`] - メール送信（SMTP / SES / Noop）
//! - `mock` - テスト用モック（`test-utils` feature）

#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod notification;
