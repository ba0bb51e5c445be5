//! # Taskboard ドメイン層
//!
//! メール通知チャネルのドメインモデルを定義する。
//!
//! ## 設計方針
//!
//! - **外部依存なし**: テンプレートエンジンやメール送信の詳細は持たない
//! - **enum による通知イベント**: イベント名の文字列分岐を型で表現する
//! - **翻訳は注入**: 件名ラベルの翻訳はグローバル状態ではなく [`i18n::Translator`] で受け取る
//!
//! ## 依存関係の方向
//!
//! ```text
//! notifier → infra → domain
//!     ↘               ↑
//!       ─────────────┘
//! ```
//!
//! ## モジュール構成
//!
//! - [`user`] - 通知の受信者となるユーザー
//! - [`notification`] - 通知イベント、メールメッセージ、通知エラー
//! - [`i18n`] - 件名ラベルの翻訳

pub mod i18n;
pub mod notification;
pub mod user;
