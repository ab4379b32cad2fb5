//! services/client/src/store/chat.rs
//!
//! The chat half of the session state store.
//!
//! A store is either idle (no session id) or active (session id set). At most
//! one session exists per store, and the transcript only ever holds entries
//! for the active session.

use crate::store::{skip, surface, Outcome, StateError, StoreResult};
use lingua_core::domain::{ChatMessage, ChatSession, NoticeLevel, SessionParams};
use lingua_core::ports::{LearningBackend, Notifier};
use std::sync::Arc;
use tracing::info;

const NO_CORRECTIONS_YET: &str = "No corrections yet";
const NO_CORRECTIONS_NEEDED: &str = "No corrections needed";

pub struct ChatStore {
    backend: Arc<dyn LearningBackend>,
    notifier: Arc<dyn Notifier>,
    session: ChatSession,
}

impl ChatStore {
    pub fn new(backend: Arc<dyn LearningBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            backend,
            notifier,
            session: ChatSession::default(),
        }
    }

    pub fn session(&self) -> &ChatSession {
        &self.session
    }

    pub fn is_session_active(&self) -> bool {
        self.session.is_active()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session.session_id.as_deref()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.session.messages
    }

    pub fn corrections(&self) -> &str {
        &self.session.corrections
    }

    /// Opens a new practice session. Only valid while idle.
    pub async fn start_session(&mut self, params: &SessionParams) -> StoreResult<Outcome<()>> {
        if self.session.is_active() {
            return Ok(skip(self.notifier.as_ref(), StateError::SessionAlreadyActive));
        }

        let opening = match self.backend.start_session(params).await {
            Ok(opening) => opening,
            Err(e) => {
                return Err(surface(
                    self.notifier.as_ref(),
                    "start_session",
                    "Failed to start session",
                    e.into(),
                ))
            }
        };

        info!(
            session_id = %opening.session_id,
            target = %params.target_language,
            level = %params.level,
            "session started"
        );
        self.session = ChatSession {
            session_id: Some(opening.session_id),
            messages: vec![ChatMessage::bot(opening.greeting)],
            corrections: non_empty_or(opening.corrections, NO_CORRECTIONS_YET),
        };
        self.notifier.notify(NoticeLevel::Success, "Session started");
        Ok(Outcome::Done(()))
    }

    /// Sends one user turn and appends it together with the bot's reply.
    pub async fn send_message(&mut self, text: &str) -> StoreResult<Outcome<()>> {
        let Some(session_id) = self.session.session_id.clone() else {
            return Ok(skip(self.notifier.as_ref(), StateError::NoActiveSession));
        };

        let reply = match self.backend.send_message(&session_id, text).await {
            Ok(reply) => reply,
            Err(e) => {
                return Err(surface(
                    self.notifier.as_ref(),
                    "send_message",
                    "Failed to send message",
                    e.into(),
                ))
            }
        };

        self.session.messages.push(ChatMessage::user(text));
        self.session.messages.push(ChatMessage::bot(reply.response));
        self.session.corrections = non_empty_or(reply.corrections, NO_CORRECTIONS_NEEDED);
        Ok(Outcome::Done(()))
    }

    /// Ends the session and returns the backend's feedback text.
    ///
    /// On failure the session stays active so the user can try again.
    pub async fn end_session(&mut self) -> StoreResult<Outcome<String>> {
        let Some(session_id) = self.session.session_id.clone() else {
            return Ok(skip(self.notifier.as_ref(), StateError::NoActiveSession));
        };

        let feedback = match self.backend.fetch_feedback(&session_id).await {
            Ok(feedback) => feedback,
            Err(e) => {
                return Err(surface(
                    self.notifier.as_ref(),
                    "end_session",
                    "Failed to end session",
                    e.into(),
                ))
            }
        };

        info!(%session_id, turns = self.session.messages.len(), "session ended");
        self.session.clear();
        self.notifier.notify(NoticeLevel::Success, "Session ended");
        Ok(Outcome::Done(feedback))
    }
}

fn non_empty_or(value: Option<String>, fallback: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}
