//! # 通知ワーカー
//!
//! 改行区切りの JSON（1 行 1 通知）を読み込み、メール通知サービスに渡す。
//!
//! ```text
//! {"user": {"email": "...", "name": "...", "username": "..."}, "event_name": "task.create", "event_data": {...}}
//! ```
//!
//! 1 行の失敗（不正な JSON、レンダリング失敗、送信失敗）はログに残し、次の行に進む。

use serde::Deserialize;
use serde_json::Value;
use taskboard_domain::user::User;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::usecase::EmailNotification;

/// 1 行分の通知リクエスト
#[derive(Debug, Deserialize)]
pub struct NotificationEnvelope {
    pub user:       User,
    pub event_name: String,
    #[serde(default)]
    pub event_data: Value,
}

/// 処理結果の集計
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerStats {
    /// 処理に成功した行数（送信スキップを含む）
    pub succeeded: usize,
    /// 失敗した行数
    pub failed:    usize,
}

/// 入力が尽きるまで通知リクエストを処理する
///
/// 読み込み自体の I/O エラーだけを返す。
pub async fn run<R>(notifier: &EmailNotification, reader: R) -> std::io::Result<WorkerStats>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut stats = WorkerStats::default();
    let mut line_number = 0usize;

    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let envelope: NotificationEnvelope = match serde_json::from_str(line) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::error!(line = line_number, error = %e, "通知リクエストの解析に失敗");
                stats.failed += 1;
                continue;
            }
        };

        match notifier
            .send_named(&envelope.user, &envelope.event_name, envelope.event_data)
            .await
        {
            Ok(()) => stats.succeeded += 1,
            Err(e) => {
                tracing::error!(
                    line = line_number,
                    event_name = %envelope.event_name,
                    error = %e,
                    "通知の送信に失敗"
                );
                stats.failed += 1;
            }
        }
    }

    Ok(stats)
}
