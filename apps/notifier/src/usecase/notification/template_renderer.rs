//! # テンプレートレンダラー
//!
//! tera テンプレートエンジンで通知メールの HTML 本文を生成する。
//!
//! ## 設計方針
//!
//! - **`include_str!` によるコンパイル時埋め込み**: 組み込みテンプレートはバイナリに埋め込まれる
//! - **ディレクトリによる上書き**: [`TemplateRenderer::from_dir`] で外部テンプレートを優先して読み込む
//! - **テンプレート ID**: `notification/{イベント名の . を _ に置換}`。ファイル名は `{ID}.html`
//! - **自動エスケープ**: `.html` テンプレートは tera の HTML エスケープが有効。
//!   URL は `/` を残す `escape_attribute` フィルタで属性値としてエスケープする

use std::{collections::HashMap, path::Path};

use serde_json::{Map, Value};
use taskboard_domain::notification::NotificationError;
use tera::{Context, Tera};

/// 組み込みテンプレート（名前, 内容）
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    (
        "notification/footer.html",
        include_str!("../../../templates/notification/footer.html"),
    ),
    (
        "notification/task_details.html",
        include_str!("../../../templates/notification/task_details.html"),
    ),
    (
        "notification/file_create.html",
        include_str!("../../../templates/notification/file_create.html"),
    ),
    (
        "notification/comment_create.html",
        include_str!("../../../templates/notification/comment_create.html"),
    ),
    (
        "notification/comment_update.html",
        include_str!("../../../templates/notification/comment_update.html"),
    ),
    (
        "notification/subtask_create.html",
        include_str!("../../../templates/notification/subtask_create.html"),
    ),
    (
        "notification/subtask_update.html",
        include_str!("../../../templates/notification/subtask_update.html"),
    ),
    (
        "notification/task_create.html",
        include_str!("../../../templates/notification/task_create.html"),
    ),
    (
        "notification/task_update.html",
        include_str!("../../../templates/notification/task_update.html"),
    ),
    (
        "notification/task_close.html",
        include_str!("../../../templates/notification/task_close.html"),
    ),
    (
        "notification/task_open.html",
        include_str!("../../../templates/notification/task_open.html"),
    ),
    (
        "notification/task_move_column.html",
        include_str!("../../../templates/notification/task_move_column.html"),
    ),
    (
        "notification/task_move_position.html",
        include_str!("../../../templates/notification/task_move_position.html"),
    ),
    (
        "notification/task_move_swimlane.html",
        include_str!("../../../templates/notification/task_move_swimlane.html"),
    ),
    (
        "notification/task_assignee_change.html",
        include_str!("../../../templates/notification/task_assignee_change.html"),
    ),
    (
        "notification/task_overdue.html",
        include_str!("../../../templates/notification/task_overdue.html"),
    ),
];

/// テンプレートレンダラー
///
/// tera テンプレートエンジンをラップし、テンプレート ID とデータから本文を生成する。
pub struct TemplateRenderer {
    engine: Tera,
}

impl TemplateRenderer {
    /// 組み込みテンプレートだけを持つレンダラーを作成
    pub fn new() -> Result<Self, NotificationError> {
        Ok(Self {
            engine: builtin_engine()?,
        })
    }

    /// `dir` 配下の `**/*.html` を読み込み、組み込みテンプレートで補完したレンダラーを作成
    ///
    /// 同名のテンプレートはディレクトリ側が優先される。
    /// テンプレート名は `dir` からの相対パス（例: `notification/task_create.html`）。
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self, NotificationError> {
        let pattern = format!("{}/**/*.html", dir.as_ref().display());
        let mut engine =
            Tera::new(&pattern).map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        // extend は既存の同名テンプレートを上書きしない
        engine
            .extend(&builtin_engine()?)
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;
        register_filters(&mut engine);

        tracing::debug!(
            dir = %dir.as_ref().display(),
            templates = engine.get_template_names().count(),
            "通知テンプレートを読み込みました"
        );

        Ok(Self { engine })
    }

    /// テンプレートが登録されているか
    pub fn has_template(&self, template_id: &str) -> bool {
        let name = template_file_name(template_id);
        self.engine.get_template_names().any(|n| n == name)
    }

    /// テンプレート ID とデータから本文をレンダリングする
    ///
    /// # 引数
    ///
    /// - `template_id`: テンプレート ID（例: `notification/task_create`）
    /// - `data`: テンプレートに渡すデータ
    pub fn render(
        &self,
        template_id: &str,
        data: Map<String, Value>,
    ) -> Result<String, NotificationError> {
        let context = Context::from_value(Value::Object(data))
            .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;

        self.engine
            .render(&template_file_name(template_id), &context)
            .map_err(|e| NotificationError::TemplateFailed(format!("{template_id}: {e:?}")))
    }
}

fn builtin_engine() -> Result<Tera, NotificationError> {
    let mut engine = Tera::default();
    engine
        .add_raw_templates(BUILTIN_TEMPLATES.iter().copied())
        .map_err(|e| NotificationError::TemplateFailed(e.to_string()))?;
    register_filters(&mut engine);
    Ok(engine)
}

fn register_filters(engine: &mut Tera) {
    engine.register_filter("escape_attribute", escape_attribute);
}

/// 属性値として安全な文字列にエスケープする
///
/// tera 標準の HTML エスケープと異なり `/` はそのまま残す。
fn escape_attribute(value: &Value, _args: &HashMap<String, Value>) -> tera::Result<Value> {
    let text = match value {
        Value::String(text) => text.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    };

    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            c => escaped.push(c),
        }
    }
    Ok(Value::String(escaped))
}

fn template_file_name(template_id: &str) -> String {
    format!("{template_id}.html")
}
