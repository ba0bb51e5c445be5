//! # Notifier ワーカー
//!
//! 標準入力から改行区切りの通知リクエスト（JSON）を読み込み、メール通知を送信する。
//!
//! ## 環境変数
//!
//! 送信設定は [`taskboard_notifier::config`] を参照。ログは以下で制御する。
//!
//! | 変数名 | 必須 | 説明 |
//! |--------|------|------|
//! | `RUST_LOG` | No | ログフィルタ（デフォルト: `info,taskboard=debug`） |
//! | `LOG_FORMAT` | No | `json` / `pretty`（デフォルト: `pretty`） |
//!
//! ## 起動方法
//!
//! ```bash
//! # 開発環境（Mailpit）
//! NOTIFICATION_BACKEND=smtp cargo run -p taskboard-notifier < events.jsonl
//! ```

use taskboard_notifier::{bootstrap, config::NotifierConfig, worker};
use taskboard_shared::observability::{TracingConfig, init_tracing};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env ファイルを読み込む（存在する場合）
    dotenvy::dotenv().ok();

    let tracing_config = TracingConfig::from_env("notifier");
    init_tracing(&tracing_config)?;
    let _span = tracing::info_span!("app", service = %tracing_config.service_name).entered();

    let config = NotifierConfig::from_env()?;
    tracing::info!(
        backend = %config.backend,
        application_url = %config.application_url,
        "Notifier を起動します"
    );

    let notifier = bootstrap::build_notifier(&config).await?;

    let stats = worker::run(&notifier, BufReader::new(tokio::io::stdin())).await?;
    tracing::info!(
        succeeded = stats.succeeded,
        failed = stats.failed,
        "Notifier を終了します"
    );

    Ok(())
}
