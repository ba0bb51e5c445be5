//! # ユーザー
//!
//! 通知の受信者となるユーザーを定義する。
//!
//! ホストアプリケーションのユーザーレコードのうち、メール通知に必要な
//! 属性（メールアドレス、氏名、ユーザー名）だけを保持する。
//!
//! ## 使用例
//!
//! ```rust
//! use taskboard_domain::user::User;
//!
//! let user = User::new("alice").with_email("alice@example.com");
//!
//! assert_eq!(user.email(), Some("alice@example.com"));
//! assert_eq!(user.display_name(), "alice");
//! ```

use serde::{Deserialize, Serialize};

/// 通知の受信者
///
/// `email` と `name` は未設定（`null`）または空文字列を取りうる。
/// 空文字列は未設定と同じ扱いになる。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    email:    Option<String>,
    #[serde(default)]
    name:     Option<String>,
    username: String,
}

impl User {
    /// ユーザー名だけを持つユーザーを作成する
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            email:    None,
            name:     None,
            username: username.into(),
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// 送信可能なメールアドレスを返す
    ///
    /// 未設定または空文字列の場合は `None`。
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref().filter(|email| !email.is_empty())
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// 表示名を返す
    ///
    /// 氏名が空でなければ氏名、そうでなければユーザー名。
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => &self.username,
        }
    }
}
