//! # Notifier 設定
//!
//! 環境変数から通知ワーカーの設定を読み込む。
//!
//! | 変数名 | デフォルト | 説明 |
//! |--------|-----------|------|
//! | `APPLICATION_URL` | `http://localhost/` | メール内リンクのベース URL |
//! | `NOTIFICATION_BACKEND` | `noop` | `smtp` / `ses` / `noop` |
//! | `SMTP_HOST` | `localhost` | SMTP ホスト |
//! | `SMTP_PORT` | `1025` | SMTP ポート |
//! | `NOTIFICATION_FROM_ADDRESS` | `noreply@taskboard.example.com` | 送信元アドレス |
//! | `NOTIFICATION_TEMPLATE_DIR` | なし | テンプレート上書きディレクトリ |
//! | `NOTIFICATION_TRANSLATIONS` | なし | 翻訳カタログ（JSON）のパス |

use std::{env, path::PathBuf};

use crate::error::ConfigError;

/// 送信バックエンド
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum NotificationBackend {
    /// Mailpit（開発）/ SMTP サーバー経由で送信
    Smtp,
    /// Amazon SES v2 経由で送信（本番）
    Ses,
    /// 送信しない（ログ出力のみ）
    Noop,
}

/// 通知ワーカーの設定
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    /// アプリケーション URL（テンプレートの `application_url`）
    pub application_url:   String,
    /// 送信バックエンド
    pub backend:           NotificationBackend,
    /// SMTP ホスト（backend=smtp の場合に使用）
    pub smtp_host:         String,
    /// SMTP ポート（backend=smtp の場合に使用）
    pub smtp_port:         u16,
    /// 送信元メールアドレス
    pub from_address:      String,
    /// テンプレート上書きディレクトリ
    pub template_dir:      Option<PathBuf>,
    /// 翻訳カタログのパス
    pub translations_path: Option<PathBuf>,
}

impl NotifierConfig {
    /// 環境変数から設定を読み込む
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// 任意の参照関数から設定を読み込む
    ///
    /// 空文字列は未設定として扱う。
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|value| !value.is_empty());

        let backend = match get("NOTIFICATION_BACKEND") {
            Some(value) => value
                .parse::<NotificationBackend>()
                .map_err(|_| ConfigError::InvalidValue {
                    name:   "NOTIFICATION_BACKEND",
                    reason: "smtp / ses / noop のいずれかを指定してください".to_string(),
                    value,
                })?,
            None => NotificationBackend::Noop,
        };

        let smtp_port = match get("SMTP_PORT") {
            Some(value) => value.parse::<u16>().map_err(|e| {
                ConfigError::InvalidValue {
                    name:   "SMTP_PORT",
                    reason: e.to_string(),
                    value,
                }
            })?,
            None => 1025,
        };

        Ok(Self {
            application_url: get("APPLICATION_URL")
                .unwrap_or_else(|| "http://localhost/".to_string()),
            backend,
            smtp_host: get("SMTP_HOST").unwrap_or_else(|| "localhost".to_string()),
            smtp_port,
            from_address: get("NOTIFICATION_FROM_ADDRESS")
                .unwrap_or_else(|| "noreply@taskboard.example.com".to_string()),
            template_dir: get("NOTIFICATION_TEMPLATE_DIR").map(PathBuf::from),
            translations_path: get("NOTIFICATION_TRANSLATIONS").map(PathBuf::from),
        })
    }
}

#[cfg(test)]
mod tests {
    // テスト間で環境変数の競合を避けるため、from_lookup で検証する

    use std::collections::HashMap;

    use pretty_assertions::assert_eq;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<NotifierConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        NotifierConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn test_未設定の場合はデフォルト値を使う() {
        let config = load(&[]).unwrap();

        assert_eq!(config.application_url, "http://localhost/");
        assert_eq!(config.backend, NotificationBackend::Noop);
        assert_eq!(config.smtp_host, "localhost");
        assert_eq!(config.smtp_port, 1025);
        assert_eq!(config.from_address, "noreply@taskboard.example.com");
        assert_eq!(config.template_dir, None);
        assert_eq!(config.translations_path, None);
    }

    #[test]
    fn test_環境変数の値を読み込む() {
        let config = load(&[
            ("APPLICATION_URL", "https://tasks.example.org/"),
            ("NOTIFICATION_BACKEND", "smtp"),
            ("SMTP_HOST", "mailpit"),
            ("SMTP_PORT", "2525"),
            ("NOTIFICATION_FROM_ADDRESS", "tasks@example.org"),
            ("NOTIFICATION_TEMPLATE_DIR", "/etc/taskboard/templates"),
            ("NOTIFICATION_TRANSLATIONS", "/etc/taskboard/fr_FR.json"),
        ])
        .unwrap();

        assert_eq!(config.application_url, "https://tasks.example.org/");
        assert_eq!(config.backend, NotificationBackend::Smtp);
        assert_eq!(config.smtp_host, "mailpit");
        assert_eq!(config.smtp_port, 2525);
        assert_eq!(config.from_address, "tasks@example.org");
        assert_eq!(
            config.template_dir,
            Some(PathBuf::from("/etc/taskboard/templates"))
        );
        assert_eq!(
            config.translations_path,
            Some(PathBuf::from("/etc/taskboard/fr_FR.json"))
        );
    }

    #[test]
    fn test_空文字列は未設定として扱う() {
        let config = load(&[("APPLICATION_URL", ""), ("NOTIFICATION_BACKEND", "")]).unwrap();

        assert_eq!(config.application_url, "http://localhost/");
        assert_eq!(config.backend, NotificationBackend::Noop);
    }

    #[test]
    fn test_不明なバックエンドはエラー() {
        let result = load(&[("NOTIFICATION_BACKEND", "carrier-pigeon")]);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "NOTIFICATION_BACKEND",
                ..
            })
        ));
    }

    #[test]
    fn test_不正なsmtpポートはエラー() {
        let result = load(&[("SMTP_PORT", "99999")]);

        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                name: "SMTP_PORT",
                ..
            })
        ));
    }

    #[test]
    fn test_バックエンド名の文字列変換() {
        assert_eq!(NotificationBackend::Ses.to_string(), "ses");
        assert_eq!(
            "noop".parse::<NotificationBackend>().unwrap(),
            NotificationBackend::Noop
        );
    }
}
