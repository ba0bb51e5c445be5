//! # メール通知サービス
//!
//! 件名の導出 → 本文のテンプレートレンダリング → メール送信を統合するサービス。
//!
//! ## 設計方針
//!
//! - **メールアドレスなしはスキップ**: エラーにせず、送信も行わない
//! - **失敗は呼び出し元へ**: レンダリング失敗・送信失敗はリトライせずそのまま返す
//! - **依存性注入**: `NotificationSender` と `Translator` は trait で抽象化
//! - **呼び出し元データ優先**: `application_url` はイベントデータに同名キーがない場合だけ補う

use std::sync::Arc;

use serde_json::Value;
use taskboard_domain::{
    i18n::Translator,
    notification::{EmailMessage, NotificationError, NotificationEvent, TaskSummary},
    user::User,
};
use taskboard_infra::notification::NotificationSender;
use taskboard_shared::{event_log::event, log_business_event};

use super::TemplateRenderer;

/// テンプレートに補うアプリケーション URL のキー
const APPLICATION_URL_KEY: &str = "application_url";

/// メール通知サービス
///
/// ユーザー 1 人・イベント 1 件につき、最大 1 通のメールを送信する。
pub struct EmailNotification {
    sender:            Arc<dyn NotificationSender>,
    template_renderer: TemplateRenderer,
    translator:        Arc<dyn Translator>,
    application_url:   String,
}

impl EmailNotification {
    pub fn new(
        sender: Arc<dyn NotificationSender>,
        template_renderer: TemplateRenderer,
        translator: Arc<dyn Translator>,
        application_url: String,
    ) -> Self {
        Self {
            sender,
            template_renderer,
            translator,
            application_url,
        }
    }

    /// ユーザーにメール通知を送信する
    ///
    /// メールアドレスが未設定または空の場合は何もしない。
    /// 宛先の表示名は氏名、氏名が空ならユーザー名。
    pub async fn send(
        &self,
        user: &User,
        event: &NotificationEvent,
    ) -> Result<(), NotificationError> {
        let Some(to) = user.email() else {
            log_skipped(user, event.name());
            return Ok(());
        };

        let email = EmailMessage {
            to:      to.to_string(),
            to_name: user.display_name().to_string(),
            subject: self.mail_subject(event),
            body:    self.mail_content(event)?,
        };

        match self.sender.send_email(&email).await {
            Ok(()) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_SENT,
                    event.result = event::result::SUCCESS,
                    notification.channel = event::channel::EMAIL,
                    notification.event_name = event.name(),
                    notification.recipient = %email.to,
                    "通知メール送信成功"
                );
                Ok(())
            }
            Err(e) => {
                log_business_event!(
                    event.category = event::category::NOTIFICATION,
                    event.action = event::action::NOTIFICATION_FAILED,
                    event.result = event::result::FAILURE,
                    notification.channel = event::channel::EMAIL,
                    notification.event_name = event.name(),
                    notification.recipient = %email.to,
                    error = %e,
                    "通知メール送信失敗"
                );
                Err(e)
            }
        }
    }

    /// イベント名とイベントデータから通知イベントを組み立てて送信する
    ///
    /// メールアドレスがない場合はイベントデータを解析せずに何もしない。
    pub async fn send_named(
        &self,
        user: &User,
        event_name: &str,
        event_data: Value,
    ) -> Result<(), NotificationError> {
        if user.email().is_none() {
            log_skipped(user, event_name);
            return Ok(());
        }

        let event = NotificationEvent::parse(event_name, event_data)?;
        self.send(user, &event).await
    }

    /// メール本文をレンダリングする
    ///
    /// テンプレート ID はイベント名から導出する（`task.move_column` →
    /// `notification/task_move_column`）。
    pub fn mail_content(&self, event: &NotificationEvent) -> Result<String, NotificationError> {
        let mut data = event.template_data()?;
        data.entry(APPLICATION_URL_KEY)
            .or_insert_with(|| Value::String(self.application_url.clone()));

        self.template_renderer.render(&event.template_id(), data)
    }

    /// メール件名を返す
    ///
    /// - タスクに紐づくイベント: `[プロジェクト名][ラベル] タイトル (#ID)`
    /// - 期限超過: `[プロジェクト名] Overdue tasks`
    /// - その他: `Notification`
    pub fn mail_subject(&self, event: &NotificationEvent) -> String {
        use NotificationEvent as E;

        let (label, data) = match event {
            E::FileCreated(data) => ("New attachment", data),
            E::CommentCreated(data) => ("New comment", data),
            E::CommentUpdated(data) => ("Comment updated", data),
            E::SubtaskCreated(data) => ("New subtask", data),
            E::SubtaskUpdated(data) => ("Subtask updated", data),
            E::TaskCreated(data) => ("New task", data),
            E::TaskUpdated(data) => ("Task updated", data),
            E::TaskClosed(data) => ("Task closed", data),
            E::TaskOpened(data) => ("Task opened", data),
            E::TaskMovedColumn(data) => ("Column change", data),
            E::TaskMovedPosition(data) => ("Position change", data),
            E::TaskMovedSwimlane(data) => ("Swimlane change", data),
            E::TaskAssigneeChanged(data) => ("Assignee change", data),
            E::TaskOverdue(data) => {
                return self
                    .translator
                    .translate_with("[%s] Overdue tasks", &[data.project_name.as_str()]);
            }
            E::Other { .. } => return self.translator.translate("Notification"),
        };

        standard_mail_subject(&self.translator.translate(label), &data.task)
    }
}

fn log_skipped(user: &User, event_name: &str) {
    tracing::debug!(
        username = user.username(),
        event_name,
        "メールアドレス未設定のため通知をスキップ"
    );
}

/// タスクに紐づくイベントの件名
fn standard_mail_subject(label: &str, task: &TaskSummary) -> String {
    format!(
        "[{}][{}] {} (#{})",
        task.project_name, label, task.title, task.id
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use serde_json::json;
    use taskboard_domain::i18n::{CatalogTranslator, EnglishTranslator};
    use taskboard_infra::mock::{FailingNotificationSender, MockNotificationSender};

    use super::*;

    const APPLICATION_URL: &str = "http://localhost/";

    fn make_service(sender: Arc<dyn NotificationSender>) -> EmailNotification {
        EmailNotification::new(
            sender,
            TemplateRenderer::new().unwrap(),
            Arc::new(EnglishTranslator),
            APPLICATION_URL.to_string(),
        )
    }

    fn task_event(name: &str) -> NotificationEvent {
        NotificationEvent::parse(
            name,
            json!({"task": {"project_name": "P", "title": "T", "id": 5}}),
        )
        .unwrap()
    }

    fn user_with_email() -> User {
        User::new("jdoe").with_email("jdoe@example.com")
    }

    // ===== 件名 =====

    #[rstest]
    #[case("file.create", "[P][New attachment] T (#5)")]
    #[case("comment.create", "[P][New comment] T (#5)")]
    #[case("comment.update", "[P][Comment updated] T (#5)")]
    #[case("subtask.create", "[P][New subtask] T (#5)")]
    #[case("subtask.update", "[P][Subtask updated] T (#5)")]
    #[case("task.create", "[P][New task] T (#5)")]
    #[case("task.update", "[P][Task updated] T (#5)")]
    #[case("task.close", "[P][Task closed] T (#5)")]
    #[case("task.open", "[P][Task opened] T (#5)")]
    #[case("task.move_column", "[P][Column change] T (#5)")]
    #[case("task.move_position", "[P][Position change] T (#5)")]
    #[case("task.move_swimlane", "[P][Swimlane change] T (#5)")]
    #[case("task.assignee_change", "[P][Assignee change] T (#5)")]
    fn タスクイベントの件名は標準形式になる(#[case] name: &str, #[case] expected: &str) {
        let service = make_service(Arc::new(MockNotificationSender::new()));
        assert_eq!(service.mail_subject(&task_event(name)), expected);
    }

    #[test]
    fn 期限超過の件名はプロジェクト名を使う() {
        let service = make_service(Arc::new(MockNotificationSender::new()));
        let event = NotificationEvent::parse("task.overdue", json!({"project_name": "P"})).unwrap();

        assert_eq!(service.mail_subject(&event), "[P] Overdue tasks");
    }

    #[test]
    fn 未知のイベントの件名はnotificationになる() {
        let service = make_service(Arc::new(MockNotificationSender::new()));
        let event = NotificationEvent::parse("unknown.event", json!({})).unwrap();

        assert_eq!(service.mail_subject(&event), "Notification");
    }

    #[test]
    fn 件名のラベルは翻訳される() {
        let catalog = HashMap::from([
            ("New task".to_string(), "Nouvelle tâche".to_string()),
            (
                "[%s] Overdue tasks".to_string(),
                "[%s] Tâches en retard".to_string(),
            ),
            ("Notification".to_string(), "Avis".to_string()),
        ]);
        let service = EmailNotification::new(
            Arc::new(MockNotificationSender::new()),
            TemplateRenderer::new().unwrap(),
            Arc::new(CatalogTranslator::new(catalog)),
            APPLICATION_URL.to_string(),
        );

        assert_eq!(
            service.mail_subject(&task_event("task.create")),
            "[P][Nouvelle tâche] T (#5)"
        );
        let overdue =
            NotificationEvent::parse("task.overdue", json!({"project_name": "P"})).unwrap();
        assert_eq!(service.mail_subject(&overdue), "[P] Tâches en retard");
        let other = NotificationEvent::parse("unknown.event", json!({})).unwrap();
        assert_eq!(service.mail_subject(&other), "Avis");
    }

    // ===== 本文 =====

    #[test]
    fn 本文にapplication_urlが補われる() {
        let service = make_service(Arc::new(MockNotificationSender::new()));

        let body = service.mail_content(&task_event("task.close")).unwrap();

        assert!(body.contains("T (#5)"));
        assert!(body.contains("http://localhost/?controller=task"));
    }

    #[test]
    fn 呼び出し元のapplication_urlは上書きしない() {
        let service = make_service(Arc::new(MockNotificationSender::new()));
        let event = NotificationEvent::parse(
            "task.close",
            json!({
                "task": {"project_name": "P", "title": "T", "id": 5},
                "application_url": "https://tasks.example.org/"
            }),
        )
        .unwrap();

        let body = service.mail_content(&event).unwrap();

        assert!(body.contains("https://tasks.example.org/?controller=task"));
        assert!(!body.contains(APPLICATION_URL));
    }

    #[test]
    fn テンプレートがないイベントの本文はtemplate_failedになる() {
        let service = make_service(Arc::new(MockNotificationSender::new()));
        let event = NotificationEvent::parse("unknown.event", json!({})).unwrap();

        let result = service.mail_content(&event);

        assert!(matches!(result, Err(NotificationError::TemplateFailed(_))));
    }

    // ===== 送信 =====

    #[rstest]
    #[case(User::new("jdoe"))]
    #[case(User::new("jdoe").with_email(""))]
    #[tokio::test]
    async fn メールアドレスがない場合は送信しない(#[case] user: User) {
        let sender = MockNotificationSender::new();
        let service = make_service(Arc::new(sender.clone()));

        let result = service.send(&user, &task_event("task.create")).await;

        assert!(result.is_ok());
        assert!(sender.sent_emails().is_empty());
    }

    #[rstest]
    #[case(User::new("jdoe").with_email("jdoe@example.com").with_name("John Doe"), "John Doe")]
    #[case(User::new("jdoe").with_email("jdoe@example.com").with_name(""), "jdoe")]
    #[case(User::new("jdoe").with_email("jdoe@example.com"), "jdoe")]
    #[tokio::test]
    async fn メールアドレスがある場合は1回だけ送信する(
        #[case] user: User,
        #[case] expected_name: &str,
    ) {
        let sender = MockNotificationSender::new();
        let service = make_service(Arc::new(sender.clone()));

        service
            .send(&user, &task_event("task.create"))
            .await
            .unwrap();

        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jdoe@example.com");
        assert_eq!(sent[0].to_name, expected_name);
        assert_eq!(sent[0].subject, "[P][New task] T (#5)");
        assert!(sent[0].body.contains("T (#5)"));
    }

    #[tokio::test]
    async fn 送信失敗は呼び出し元に返す() {
        let sender = FailingNotificationSender::new();
        let service = make_service(Arc::new(sender.clone()));

        let result = service
            .send(&user_with_email(), &task_event("task.create"))
            .await;

        assert!(matches!(result, Err(NotificationError::SendFailed(_))));
        assert_eq!(sender.attempts(), 1);
    }

    #[tokio::test]
    async fn レンダリング失敗時は送信しない() {
        let sender = MockNotificationSender::new();
        let service = make_service(Arc::new(sender.clone()));
        let event = NotificationEvent::parse("unknown.event", json!({})).unwrap();

        let result = service.send(&user_with_email(), &event).await;

        assert!(matches!(result, Err(NotificationError::TemplateFailed(_))));
        assert!(sender.sent_emails().is_empty());
    }

    #[tokio::test]
    async fn send_namedはイベント名とデータから送信する() {
        let sender = MockNotificationSender::new();
        let service = make_service(Arc::new(sender.clone()));

        service
            .send_named(
                &user_with_email(),
                "task.overdue",
                json!({
                    "project_name": "P",
                    "tasks": [{"id": 1, "title": "Late"}]
                }),
            )
            .await
            .unwrap();

        let sent = sender.sent_emails();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].subject, "[P] Overdue tasks");
        assert!(sent[0].body.contains("#1 Late"));
    }

    #[tokio::test]
    async fn send_namedは不正なイベントデータを拒否する() {
        let sender = MockNotificationSender::new();
        let service = make_service(Arc::new(sender.clone()));

        let result = service
            .send_named(&user_with_email(), "task.create", json!({}))
            .await;

        assert!(matches!(result, Err(NotificationError::InvalidPayload(_))));
        assert!(sender.sent_emails().is_empty());
    }

    #[rstest]
    #[case(User::new("bob"), json!({}))]
    #[case(User::new("bob").with_email(""), json!({"task": {"id": 1.5, "title": "T"}}))]
    #[case(User::new("bob"), json!("not an object"))]
    #[tokio::test]
    async fn send_namedはメールアドレスがなければイベントデータを検証しない(
        #[case] user: User,
        #[case] event_data: Value,
    ) {
        let sender = MockNotificationSender::new();
        let service = make_service(Arc::new(sender.clone()));

        let result = service.send_named(&user, "task.create", event_data).await;

        assert!(result.is_ok(), "{result:?}");
        assert!(sender.sent_emails().is_empty());
    }

    #[test]
    fn サービスはsendとsyncを実装している() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<EmailNotification>();
    }
}
