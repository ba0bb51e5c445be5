//! # Taskboard 共有ユーティリティ
//!
//! ワークスペース全体で使用される共通ユーティリティを提供する。
//!
//! ## 設計方針
//!
//! - ビジネスロジックを含まない純粋なユーティリティのみを配置
//! - subscriber の初期化は `observability` feature を有効にしたバイナリだけが使う

pub mod event_log;
pub mod observability;
