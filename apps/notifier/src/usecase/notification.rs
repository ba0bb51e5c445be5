//! # 通知ユースケース
//!
//! ホストアプリケーションのイベントに伴うメール通知の生成・送信を統合する。
//!
//! ## モジュール構成
//!
//! - [`template_renderer`] - tera テンプレートエンジンによる本文生成
//! - [`service`] - 件名導出 + 本文レンダリング + 送信の統合サービス

pub mod service;
pub mod template_renderer;

pub use service::EmailNotification;
pub use template_renderer::TemplateRenderer;
