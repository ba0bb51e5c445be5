//! # 依存コンポーネントの組み立て
//!
//! 設定から送信バックエンド、翻訳、テンプレートレンダラーを構築し、
//! [`EmailNotification`] を組み立てる。

use std::{fs, path::Path, sync::Arc};

use taskboard_domain::i18n::{CatalogTranslator, EnglishTranslator, Translator};
use taskboard_infra::notification::{
    NoopNotificationSender,
    NotificationSender,
    SesNotificationSender,
    SmtpNotificationSender,
};

use crate::{
    config::{NotificationBackend, NotifierConfig},
    error::ConfigError,
    usecase::{EmailNotification, TemplateRenderer},
};

/// 設定に応じた送信バックエンドを構築する
///
/// SES の場合は AWS の標準的な認証情報チェーン（環境変数、プロファイル等）を使う。
pub async fn build_sender(config: &NotifierConfig) -> Arc<dyn NotificationSender> {
    match config.backend {
        NotificationBackend::Smtp => {
            tracing::info!(
                host = %config.smtp_host,
                port = config.smtp_port,
                "SMTP で通知メールを送信します"
            );
            Arc::new(SmtpNotificationSender::new(
                &config.smtp_host,
                config.smtp_port,
                config.from_address.clone(),
            ))
        }
        NotificationBackend::Ses => {
            tracing::info!("Amazon SES で通知メールを送信します");
            let aws_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
            let client = aws_sdk_sesv2::Client::new(&aws_config);
            Arc::new(SesNotificationSender::new(
                client,
                config.from_address.clone(),
            ))
        }
        NotificationBackend::Noop => {
            tracing::info!("通知メールは送信しません（noop）");
            Arc::new(NoopNotificationSender)
        }
    }
}

/// 翻訳を構築する
///
/// カタログのパスが未設定の場合は英語（恒等変換）。
pub fn build_translator(path: Option<&Path>) -> Result<Arc<dyn Translator>, ConfigError> {
    let Some(path) = path else {
        return Ok(Arc::new(EnglishTranslator));
    };

    let to_error = |reason: String| ConfigError::Translations {
        path: path.display().to_string(),
        reason,
    };
    let json = fs::read_to_string(path).map_err(|e| to_error(e.to_string()))?;
    let translator = CatalogTranslator::from_json_str(&json).map_err(|e| to_error(e.to_string()))?;

    tracing::info!(
        path = %path.display(),
        entries = translator.len(),
        "翻訳カタログを読み込みました"
    );

    Ok(Arc::new(translator))
}

/// テンプレートレンダラーを構築する
pub fn build_renderer(dir: Option<&Path>) -> anyhow::Result<TemplateRenderer> {
    let renderer = match dir {
        Some(dir) => TemplateRenderer::from_dir(dir)?,
        None => TemplateRenderer::new()?,
    };
    Ok(renderer)
}

/// 設定からメール通知サービスを組み立てる
pub async fn build_notifier(config: &NotifierConfig) -> anyhow::Result<EmailNotification> {
    let sender = build_sender(config).await;
    let translator = build_translator(config.translations_path.as_deref())?;
    let renderer = build_renderer(config.template_dir.as_deref())?;

    Ok(EmailNotification::new(
        sender,
        renderer,
        translator,
        config.application_url.clone(),
    ))
}
