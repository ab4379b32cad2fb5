//! crates/lingua_core/src/domain.rs
//!
//! Defines the pure, core data structures for the client.
//! These structs are independent of any wire or storage format.

use chrono::{DateTime, Utc};

/// The display identity of the logged-in user.
///
/// Never verified against the backend after login; it is whatever name the
/// user typed when the token was issued.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
}

/// Client-side authentication status.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    pub is_authenticated: bool,
    pub user: Option<User>,
}

impl AuthState {
    pub fn authenticated(username: Option<String>) -> Self {
        Self {
            is_authenticated: true,
            user: username.map(|username| User { username }),
        }
    }
}

/// Who authored a transcript entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sender {
    User,
    Bot,
}

impl Sender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sender::User => "user",
            Sender::Bot => "bot",
        }
    }
}

/// A single turn in the transcript.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub sender: Sender,
    pub content: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::User,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self {
            sender: Sender::Bot,
            content: content.into(),
            sent_at: Utc::now(),
        }
    }
}

/// The in-memory state of one practice conversation.
///
/// `messages` is only ever non-empty while `session_id` is set; both are
/// reset together by [`ChatSession::clear`].
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub session_id: Option<String>,
    pub messages: Vec<ChatMessage>,
    pub corrections: String,
}

impl ChatSession {
    pub fn is_active(&self) -> bool {
        self.session_id.is_some()
    }

    pub fn clear(&mut self) {
        self.session_id = None;
        self.messages.clear();
        self.corrections.clear();
    }
}

/// The three choices a learner makes before a session starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionParams {
    pub target_language: String,
    pub native_language: String,
    pub level: String,
}

/// What the backend hands back when a session is opened.
#[derive(Debug, Clone)]
pub struct SessionOpening {
    pub session_id: String,
    pub greeting: String,
    pub corrections: Option<String>,
}

/// One bot turn in reply to a user message.
#[derive(Debug, Clone)]
pub struct BotReply {
    pub response: String,
    pub corrections: Option<String>,
}

/// The durable mirror of the token and username.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialRecord {
    pub token: Option<String>,
    pub username: Option<String>,
}

/// Severity of a transient user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}
