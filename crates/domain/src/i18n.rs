//! # 翻訳
//!
//! メール件名に使うラベルを翻訳する。
//!
//! メッセージ ID は英語の原文そのもの（例: `"New task"`）。翻訳が見つからない場合は
//! メッセージ ID をそのまま返すため、[`EnglishTranslator`] は恒等変換になる。
//!
//! 書式文字列は `%s` / `%d` を位置引数で順に置換する。`%%` は `%` になる。

use std::collections::HashMap;

/// 翻訳トレイト
///
/// 起動時に構築して通知サービスに注入する。
pub trait Translator: Send + Sync {
    /// メッセージ ID を翻訳する
    fn translate(&self, msgid: &str) -> String;

    /// メッセージ ID を翻訳し、プレースホルダを `args` で置換する
    fn translate_with(&self, msgid: &str, args: &[&str]) -> String {
        substitute(&self.translate(msgid), args)
    }
}

/// 英語（恒等変換）
#[derive(Debug, Clone, Copy, Default)]
pub struct EnglishTranslator;

impl Translator for EnglishTranslator {
    fn translate(&self, msgid: &str) -> String {
        msgid.to_string()
    }
}

/// メッセージカタログによる翻訳
///
/// カタログにないメッセージ ID は原文のまま返す。
#[derive(Debug, Clone, Default)]
pub struct CatalogTranslator {
    catalog: HashMap<String, String>,
}

impl CatalogTranslator {
    pub fn new(catalog: HashMap<String, String>) -> Self {
        Self { catalog }
    }

    /// JSON オブジェクト（`{"New task": "Nouvelle tâche", ...}`）からカタログを読み込む
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn len(&self) -> usize {
        self.catalog.len()
    }

    pub fn is_empty(&self) -> bool {
        self.catalog.is_empty()
    }
}

impl Translator for CatalogTranslator {
    fn translate(&self, msgid: &str) -> String {
        self.catalog
            .get(msgid)
            .cloned()
            .unwrap_or_else(|| msgid.to_string())
    }
}

/// `%s` / `%d` を引数で順に置換する
///
/// 引数が足りないプレースホルダはそのまま残す。
fn substitute(format: &str, args: &[&str]) -> String {
    let mut output = String::with_capacity(format.len());
    let mut args = args.iter();
    let mut chars = format.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            output.push(c);
            continue;
        }

        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                output.push('%');
            }
            Some(spec @ ('s' | 'd')) => {
                chars.next();
                match args.next() {
                    Some(arg) => output.push_str(arg),
                    None => {
                        output.push('%');
                        output.push(spec);
                    }
                }
            }
            _ => output.push('%'),
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    #[test]
    fn test_英語翻訳は原文を返す() {
        assert_eq!(EnglishTranslator.translate("New task"), "New task");
    }

    #[rstest]
    #[case("[%s] Overdue tasks", &["Website"], "[Website] Overdue tasks")]
    #[case("%s and %s", &["a", "b"], "a and b")]
    #[case("#%d", &["42"], "#42")]
    #[case("100%%", &[], "100%")]
    #[case("[%s]", &[], "[%s]")]
    #[case("50% off", &[], "50% off")]
    fn test_プレースホルダを順に置換する(
        #[case] format: &str,
        #[case] args: &[&str],
        #[case] expected: &str,
    ) {
        assert_eq!(EnglishTranslator.translate_with(format, args), expected);
    }

    #[test]
    fn test_カタログにある場合は翻訳を返す() {
        let translator = CatalogTranslator::from_json_str(
            r#"{"New task": "Nouvelle tâche", "[%s] Overdue tasks": "[%s] Tâches en retard"}"#,
        )
        .unwrap();

        assert_eq!(translator.len(), 2);
        assert_eq!(translator.translate("New task"), "Nouvelle tâche");
        assert_eq!(
            translator.translate_with("[%s] Overdue tasks", &["Website"]),
            "[Website] Tâches en retard"
        );
    }

    #[test]
    fn test_カタログにない場合は原文を返す() {
        let translator = CatalogTranslator::default();

        assert!(translator.is_empty());
        assert_eq!(translator.translate("Notification"), "Notification");
    }

    #[test]
    fn test_不正なjsonはエラーになる() {
        assert!(CatalogTranslator::from_json_str("[1, 2]").is_err());
    }
}
