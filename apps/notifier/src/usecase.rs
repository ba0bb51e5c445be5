//! # ユースケース層
//!
//! 通知チャネルごとのユースケースを公開する。現在はメールのみ。

pub mod notification;

pub use notification::{EmailNotification, TemplateRenderer};
