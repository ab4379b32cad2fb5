//! services/client/src/store/mod.rs
//!
//! The session state store: the auth half and the chat half, plus the result
//! types and the failure-surfacing policy they share.

pub mod auth;
pub mod chat;

#[cfg(test)]
pub(crate) mod testing;

pub use auth::{AuthStore, Verification};
pub use chat::ChatStore;

use lingua_core::domain::NoticeLevel;
use lingua_core::ports::{Notifier, PortError};
use tracing::{debug, error};

/// Where the caller should take the user after an auth operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Chat,
}

/// An operation invoked in a state that does not allow it.
///
/// Never returned as an `Err`: the store warns the user and hands it back
/// inside [`Outcome::Skipped`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("No active session")]
    NoActiveSession,
    #[error("A session is already active")]
    SessionAlreadyActive,
    #[error("You are not logged in")]
    NotAuthenticated,
}

/// Result of an operation that may be skipped because of the current state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    Done(T),
    Skipped(StateError),
}

impl<T> Outcome<T> {
    pub fn is_done(&self) -> bool {
        matches!(self, Outcome::Done(_))
    }

    pub fn done(self) -> Option<T> {
        match self {
            Outcome::Done(value) => Some(value),
            Outcome::Skipped(_) => None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The login response carried no usable token.
    #[error("missing token")]
    MissingToken,
}

/// Error returned by every failing store operation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Transport failures and credential persistence failures.
    #[error(transparent)]
    Port(#[from] PortError),
}

impl StoreError {
    /// The text shown to the user, falling back to `default` when neither the
    /// backend nor the transport produced anything readable.
    pub fn user_message(&self, default: &str) -> String {
        match self {
            StoreError::Auth(e) => e.to_string(),
            StoreError::Port(e) => e.user_message().unwrap_or_else(|| default.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Logs a failed operation, shows it to the user, and hands the error back
/// so the caller can propagate it.
pub(crate) fn surface(
    notifier: &dyn Notifier,
    operation: &'static str,
    default: &str,
    err: StoreError,
) -> StoreError {
    // The notifier already shows the failure; only a malformed response is
    // worth an error-level log line on top of that.
    match &err {
        StoreError::Port(PortError::Unexpected(_)) => {
            error!(operation, error = %err, "store operation failed")
        }
        _ => debug!(operation, error = %err, "store operation failed"),
    }
    notifier.notify(NoticeLevel::Error, &err.user_message(default));
    err
}

/// Warns the user about an operation skipped in the wrong state.
pub(crate) fn skip<T>(notifier: &dyn Notifier, reason: StateError) -> Outcome<T> {
    notifier.notify(NoticeLevel::Warning, &reason.to_string());
    Outcome::Skipped(reason)
}
