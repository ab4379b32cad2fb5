//! crates/lingua_core/src/ports.rs
//!
//! Defines the service contracts (traits) the client's stores depend on.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! stores to be independent of the concrete HTTP client, the credential file
//! and the terminal.

use async_trait::async_trait;
use crate::domain::{BotReply, CredentialRecord, NoticeLevel, SessionOpening, SessionParams};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (network, filesystem).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    /// A network failure or a non-2xx response. `message` is the backend's own
    /// `message` field when the error body carried one.
    #[error("Transport error: {}", .message.as_deref().unwrap_or("request failed"))]
    Transport {
        status: Option<u16>,
        message: Option<String>,
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    /// A 2xx response whose body did not have the expected shape.
    #[error("Unexpected response: {0}")]
    Unexpected(String),
    /// The durable credential store could not be read or written.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl PortError {
    /// Best-available human-readable text: the backend's message first, then
    /// the transport-level description. `None` when neither exists.
    pub fn user_message(&self) -> Option<String> {
        match self {
            PortError::Transport {
                status,
                message,
                cause,
            } => message
                .clone()
                .filter(|m| !m.is_empty())
                .or_else(|| cause.as_ref().map(|c| c.to_string()))
                .or_else(|| status.map(|s| format!("Request failed with status code {s}"))),
            PortError::Unexpected(detail) | PortError::Storage(detail) => Some(detail.clone()),
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            PortError::Transport { status, .. } => *status,
            _ => None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait LearningBackend: Send + Sync {
    // --- Default Header Slot ---
    /// Installs (`Some`) or removes (`None`) the bearer token sent with every request.
    ///
    /// Fails, leaving the slot untouched, when the token cannot be carried in a
    /// header. Removing always succeeds.
    fn set_bearer_token(&self, token: Option<&str>) -> PortResult<()>;

    // --- Auth ---
    /// Returns the issued token, or `None` if the response carried no token.
    async fn login(&self, username: &str, password: &str) -> PortResult<Option<String>>;

    async fn register(&self, username: &str, email: &str, password: &str) -> PortResult<()>;

    /// Checks the installed token against the backend.
    async fn verify_token(&self) -> PortResult<()>;

    // --- Practice Sessions ---
    async fn start_session(&self, params: &SessionParams) -> PortResult<SessionOpening>;

    async fn send_message(&self, session_id: &str, text: &str) -> PortResult<BotReply>;

    async fn fetch_feedback(&self, session_id: &str) -> PortResult<String>;

    // --- Diagnostics ---
    async fn health(&self) -> PortResult<String>;
}

/// Durable storage for the bearer token and the last-used username.
pub trait CredentialStore: Send + Sync {
    fn load(&self) -> PortResult<CredentialRecord>;

    fn save_token(&self, token: &str) -> PortResult<()>;

    /// Removes the token only. The username is kept as a convenience.
    fn clear_token(&self) -> PortResult<()>;

    fn save_username(&self, username: &str) -> PortResult<()>;
}

/// Sink for transient user-visible notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, level: NoticeLevel, text: &str);
}
