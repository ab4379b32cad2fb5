//! Test doubles for the store ports.

use async_trait::async_trait;
use lingua_core::domain::{BotReply, NoticeLevel, SessionOpening, SessionParams};
use lingua_core::ports::{LearningBackend, Notifier, PortError, PortResult};
use std::collections::VecDeque;
use std::sync::Mutex;

//=========================================================================================
// Notifier
//=========================================================================================

#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl RecordingNotifier {
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        self.notices.lock().unwrap().clone()
    }

    pub fn count(&self, level: NoticeLevel) -> usize {
        self.notices
            .lock()
            .unwrap()
            .iter()
            .filter(|(l, _)| *l == level)
            .count()
    }

    pub fn last(&self) -> Option<(NoticeLevel, String)> {
        self.notices.lock().unwrap().last().cloned()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, level: NoticeLevel, text: &str) {
        self.notices.lock().unwrap().push((level, text.to_string()));
    }
}

//=========================================================================================
// Backend
//=========================================================================================

/// One canned reply, consumed by the next call of the matching operation.
pub enum Scripted {
    Login(PortResult<Option<String>>),
    Register(PortResult<()>),
    Verify(PortResult<()>),
    Start(PortResult<SessionOpening>),
    Chat(PortResult<BotReply>),
    Feedback(PortResult<String>),
}

/// A backend that replays scripted replies in order and records every call.
#[derive(Default)]
pub struct ScriptedBackend {
    script: Mutex<VecDeque<Scripted>>,
    calls: Mutex<Vec<String>>,
    bearer: Mutex<Option<String>>,
}

impl ScriptedBackend {
    pub fn new(script: Vec<Scripted>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Default::default()
        }
    }

    pub fn push(&self, reply: Scripted) {
        self.script.lock().unwrap().push_back(reply);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn bearer(&self) -> Option<String> {
        self.bearer.lock().unwrap().clone()
    }

    fn next(&self, call: String) -> Scripted {
        self.calls.lock().unwrap().push(call.clone());
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| panic!("no scripted reply left for `{call}`"))
    }
}

pub fn rejected(status: u16, message: Option<&str>) -> PortError {
    PortError::Transport {
        status: Some(status),
        message: message.map(str::to_string),
        cause: None,
    }
}

pub fn opening(session_id: &str, greeting: &str, corrections: Option<&str>) -> SessionOpening {
    SessionOpening {
        session_id: session_id.to_string(),
        greeting: greeting.to_string(),
        corrections: corrections.map(str::to_string),
    }
}

pub fn reply(response: &str, corrections: Option<&str>) -> BotReply {
    BotReply {
        response: response.to_string(),
        corrections: corrections.map(str::to_string),
    }
}

#[async_trait]
impl LearningBackend for ScriptedBackend {
    fn set_bearer_token(&self, token: Option<&str>) -> PortResult<()> {
        if token.is_some_and(|t| t.contains(['\r', '\n'])) {
            return Err(PortError::Unexpected("token is not a valid header value".to_string()));
        }
        *self.bearer.lock().unwrap() = token.map(str::to_string);
        Ok(())
    }

    async fn login(&self, username: &str, _password: &str) -> PortResult<Option<String>> {
        match self.next(format!("login {username}")) {
            Scripted::Login(result) => result,
            _ => panic!("unexpected login call"),
        }
    }

    async fn register(&self, username: &str, email: &str, _password: &str) -> PortResult<()> {
        match self.next(format!("register {username} {email}")) {
            Scripted::Register(result) => result,
            _ => panic!("unexpected register call"),
        }
    }

    async fn verify_token(&self) -> PortResult<()> {
        match self.next("verify".to_string()) {
            Scripted::Verify(result) => result,
            _ => panic!("unexpected verify call"),
        }
    }

    async fn start_session(&self, params: &SessionParams) -> PortResult<SessionOpening> {
        let call = format!(
            "start {}/{}/{}",
            params.target_language, params.native_language, params.level
        );
        match self.next(call) {
            Scripted::Start(result) => result,
            _ => panic!("unexpected start_session call"),
        }
    }

    async fn send_message(&self, session_id: &str, text: &str) -> PortResult<BotReply> {
        match self.next(format!("chat {session_id} {text}")) {
            Scripted::Chat(result) => result,
            _ => panic!("unexpected send_message call"),
        }
    }

    async fn fetch_feedback(&self, session_id: &str) -> PortResult<String> {
        match self.next(format!("feedback {session_id}")) {
            Scripted::Feedback(result) => result,
            _ => panic!("unexpected fetch_feedback call"),
        }
    }

    async fn health(&self) -> PortResult<String> {
        self.calls.lock().unwrap().push("health".to_string());
        Ok("healthy".to_string())
    }
}
