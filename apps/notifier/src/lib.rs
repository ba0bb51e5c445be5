//! # Notifier ライブラリ
//!
//! メール通知のユースケース、設定、ワーカーを公開する。
//! バイナリ（`main.rs`）とテストから利用する。

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod usecase;
pub mod worker;
