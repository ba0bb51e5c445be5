//! # 通知
//!
//! メール通知に関するドメインモデルを定義する。
//!
//! ## ドメイン用語
//!
//! | 型 | ドメイン用語 | 説明 |
//! |---|------------|------|
//! | [`NotificationEvent`] | 通知イベント | イベント名とイベントデータの組 |
//! | [`NotificationEventType`] | 通知イベント種別 | 14 種類: タスク、コメント、サブタスク、添付ファイル、期限超過 |
//! | [`EmailMessage`] | メールメッセージ | 件名と本文をレンダリングした結果 |
//!
//! ## 設計方針
//!
//! - **enum による通知イベント**: 各バリアントがホストアプリケーションのイベントに対応し、
//!   件名に必要なフィールドを型で保証する
//! - **追加フィールドの保持**: テンプレートが参照する任意のフィールドは `extra` に残す
//! - **未知のイベント**: [`NotificationEvent::Other`] として受け入れ、汎用の件名で送る

use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use strum::IntoStaticStr;
use thiserror::Error;

/// テンプレート ID の接頭辞
pub const TEMPLATE_PREFIX: &str = "notification/";

/// 通知送信エラー
#[derive(Debug, Error)]
pub enum NotificationError {
    /// メール送信に失敗
    #[error("メール送信に失敗: {0}")]
    SendFailed(String),

    /// テンプレートレンダリングに失敗
    #[error("テンプレートレンダリングに失敗: {0}")]
    TemplateFailed(String),

    /// イベントデータがイベント種別の形式と一致しない
    #[error("イベントデータが不正: {0}")]
    InvalidPayload(String),
}

/// 通知イベント種別
///
/// ホストアプリケーションが発行するイベント名と 1 対 1 に対応する。
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    IntoStaticStr,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
pub enum NotificationEventType {
    #[strum(serialize = "file.create")]
    FileCreate,
    #[strum(serialize = "comment.create")]
    CommentCreate,
    #[strum(serialize = "comment.update")]
    CommentUpdate,
    #[strum(serialize = "subtask.create")]
    SubtaskCreate,
    #[strum(serialize = "subtask.update")]
    SubtaskUpdate,
    #[strum(serialize = "task.create")]
    TaskCreate,
    #[strum(serialize = "task.update")]
    TaskUpdate,
    #[strum(serialize = "task.close")]
    TaskClose,
    #[strum(serialize = "task.open")]
    TaskOpen,
    #[strum(serialize = "task.move_column")]
    TaskMoveColumn,
    #[strum(serialize = "task.move_position")]
    TaskMovePosition,
    #[strum(serialize = "task.move_swimlane")]
    TaskMoveSwimlane,
    #[strum(serialize = "task.assignee_change")]
    TaskAssigneeChange,
    #[strum(serialize = "task.overdue")]
    TaskOverdue,
}

impl NotificationEventType {
    /// イベント名を返す（例: `"task.create"`）
    pub fn name(self) -> &'static str {
        self.into()
    }

    /// テンプレート ID を返す（例: `"notification/task_create"`）
    pub fn template_id(self) -> String {
        template_id(self.name())
    }
}

/// イベント名からテンプレート ID を組み立てる
///
/// `.` をすべて `_` に置き換え、[`TEMPLATE_PREFIX`] を付与する。
pub fn template_id(event_name: &str) -> String {
    format!("{TEMPLATE_PREFIX}{}", event_name.replace('.', "_"))
}

/// タスク ID
///
/// 整数、小数部のない浮動小数点数（`5.0`）、数値文字列（`"42"`）のいずれからでも
/// デシリアライズできる。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, derive_more::Display)]
#[serde(try_from = "RawTaskId")]
#[display("{_0}")]
pub struct TaskId(i64);

impl TaskId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl Serialize for TaskId {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTaskId {
    Number(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<RawTaskId> for TaskId {
    type Error = String;

    fn try_from(raw: RawTaskId) -> Result<Self, Self::Error> {
        match raw {
            RawTaskId::Number(id) => Ok(Self(id)),
            RawTaskId::Float(id) if id.fract() == 0.0 && id.abs() < i64::MAX as f64 => {
                Ok(Self(id as i64))
            }
            RawTaskId::Float(id) => Err(format!("タスク ID が整数ではありません: {id}")),
            RawTaskId::Text(text) => text
                .trim()
                .parse()
                .map(Self)
                .map_err(|_| format!("タスク ID が数値ではありません: {text:?}")),
        }
    }
}

/// 件名に使うタスク情報
///
/// テンプレートが参照するその他のタスク属性は `extra` に保持する。
/// タイトルとプロジェクト名は `null` や欠落を空文字列として扱う。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSummary {
    pub id:           TaskId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title:        String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub project_name: String,
    #[serde(flatten)]
    pub extra:        Map<String, Value>,
}

/// タスクに紐づくイベントのデータ
///
/// 期限超過以外のすべてのイベントで使用する。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskEventData {
    pub task:  TaskSummary,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// 期限超過イベントのデータ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverdueEventData {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub project_name: String,
    #[serde(default)]
    pub tasks:        Vec<Value>,
    #[serde(flatten)]
    pub extra:        Map<String, Value>,
}

/// メールメッセージ
///
/// 件名と本文のレンダリング結果。NotificationSender に渡される。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
    /// 送信先メールアドレス
    pub to:      String,
    /// 送信先の表示名
    pub to_name: String,
    /// 件名
    pub subject: String,
    /// HTML 本文
    pub body:    String,
}

/// 通知イベント
///
/// イベント種別ごとのバリアントがイベントデータを保持する。
#[derive(Debug, Clone, PartialEq)]
pub enum NotificationEvent {
    FileCreated(TaskEventData),
    CommentCreated(TaskEventData),
    CommentUpdated(TaskEventData),
    SubtaskCreated(TaskEventData),
    SubtaskUpdated(TaskEventData),
    TaskCreated(TaskEventData),
    TaskUpdated(TaskEventData),
    TaskClosed(TaskEventData),
    TaskOpened(TaskEventData),
    TaskMovedColumn(TaskEventData),
    TaskMovedPosition(TaskEventData),
    TaskMovedSwimlane(TaskEventData),
    TaskAssigneeChanged(TaskEventData),
    TaskOverdue(OverdueEventData),
    /// 種別に含まれないイベント
    Other {
        name: String,
        data: Map<String, Value>,
    },
}

impl NotificationEvent {
    /// イベント名とイベントデータから通知イベントを組み立てる
    ///
    /// 既知のイベントでデータの形式が一致しない場合（`task` がない等）は
    /// [`NotificationError::InvalidPayload`] を返す。
    pub fn parse(name: &str, data: Value) -> Result<Self, NotificationError> {
        use NotificationEventType as T;

        let Ok(event_type) = name.parse::<NotificationEventType>() else {
            return Ok(Self::Other {
                name: name.to_string(),
                data: into_object(name, data)?,
            });
        };

        let event = match event_type {
            T::FileCreate => Self::FileCreated(decode(name, data)?),
            T::CommentCreate => Self::CommentCreated(decode(name, data)?),
            T::CommentUpdate => Self::CommentUpdated(decode(name, data)?),
            T::SubtaskCreate => Self::SubtaskCreated(decode(name, data)?),
            T::SubtaskUpdate => Self::SubtaskUpdated(decode(name, data)?),
            T::TaskCreate => Self::TaskCreated(decode(name, data)?),
            T::TaskUpdate => Self::TaskUpdated(decode(name, data)?),
            T::TaskClose => Self::TaskClosed(decode(name, data)?),
            T::TaskOpen => Self::TaskOpened(decode(name, data)?),
            T::TaskMoveColumn => Self::TaskMovedColumn(decode(name, data)?),
            T::TaskMovePosition => Self::TaskMovedPosition(decode(name, data)?),
            T::TaskMoveSwimlane => Self::TaskMovedSwimlane(decode(name, data)?),
            T::TaskAssigneeChange => Self::TaskAssigneeChanged(decode(name, data)?),
            T::TaskOverdue => Self::TaskOverdue(decode(name, data)?),
        };

        Ok(event)
    }

    /// 通知イベント種別を返す（未知のイベントは `None`）
    pub fn event_type(&self) -> Option<NotificationEventType> {
        use NotificationEventType as T;

        let event_type = match self {
            Self::FileCreated(_) => T::FileCreate,
            Self::CommentCreated(_) => T::CommentCreate,
            Self::CommentUpdated(_) => T::CommentUpdate,
            Self::SubtaskCreated(_) => T::SubtaskCreate,
            Self::SubtaskUpdated(_) => T::SubtaskUpdate,
            Self::TaskCreated(_) => T::TaskCreate,
            Self::TaskUpdated(_) => T::TaskUpdate,
            Self::TaskClosed(_) => T::TaskClose,
            Self::TaskOpened(_) => T::TaskOpen,
            Self::TaskMovedColumn(_) => T::TaskMoveColumn,
            Self::TaskMovedPosition(_) => T::TaskMovePosition,
            Self::TaskMovedSwimlane(_) => T::TaskMoveSwimlane,
            Self::TaskAssigneeChanged(_) => T::TaskAssigneeChange,
            Self::TaskOverdue(_) => T::TaskOverdue,
            Self::Other { .. } => return None,
        };

        Some(event_type)
    }

    /// イベント名を返す
    pub fn name(&self) -> &str {
        match self {
            Self::Other { name, .. } => name,
            _ => self.event_type().map_or("", NotificationEventType::name),
        }
    }

    /// テンプレート ID を返す
    pub fn template_id(&self) -> String {
        template_id(self.name())
    }

    /// タスクに紐づくイベントのデータを返す
    pub fn task_data(&self) -> Option<&TaskEventData> {
        match self {
            Self::FileCreated(data)
            | Self::CommentCreated(data)
            | Self::CommentUpdated(data)
            | Self::SubtaskCreated(data)
            | Self::SubtaskUpdated(data)
            | Self::TaskCreated(data)
            | Self::TaskUpdated(data)
            | Self::TaskClosed(data)
            | Self::TaskOpened(data)
            | Self::TaskMovedColumn(data)
            | Self::TaskMovedPosition(data)
            | Self::TaskMovedSwimlane(data)
            | Self::TaskAssigneeChanged(data) => Some(data),
            Self::TaskOverdue(_) | Self::Other { .. } => None,
        }
    }

    /// テンプレートに渡すデータを返す
    ///
    /// ホストアプリケーションから受け取ったときと同じ形のマッピングになる。
    pub fn template_data(&self) -> Result<Map<String, Value>, NotificationError> {
        let value = match self {
            Self::TaskOverdue(data) => serde_json::to_value(data),
            Self::Other { data, .. } => return Ok(data.clone()),
            _ => match self.task_data() {
                Some(data) => serde_json::to_value(data),
                None => return Ok(Map::new()),
            },
        }
        .map_err(|e| NotificationError::InvalidPayload(e.to_string()))?;

        into_object(self.name(), value)
    }
}

fn decode<T: DeserializeOwned>(name: &str, data: Value) -> Result<T, NotificationError> {
    serde_json::from_value(data)
        .map_err(|e| NotificationError::InvalidPayload(format!("{name}: {e}")))
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn into_object(name: &str, data: Value) -> Result<Map<String, Value>, NotificationError> {
    match data {
        Value::Object(map) => Ok(map),
        Value::Null => Ok(Map::new()),
        other => Err(NotificationError::InvalidPayload(format!(
            "{name}: イベントデータはオブジェクトである必要があります: {other}"
        ))),
    }
}
