//! services/client/src/cli.rs
//!
//! The terminal front end: parses REPL lines into commands and drives the
//! auth and chat stores with them.

use crate::store::{AuthStore, ChatStore, Outcome, Route, Verification};
use lingua_core::domain::{ChatSession, Sender, SessionParams};
use lingua_core::ports::LearningBackend;
use rustyline::error::ReadlineError;
use std::sync::Arc;
use tracing::debug;

pub const HELP: &str = "\
Commands:
  /login <username> <password>            log in
  /register <username> <email> <password> create an account
  /logout                                 forget the saved token
  /whoami                                 show who is logged in
  /verify                                 check the saved token with the backend
  /start <target> <native> <level>        start a practice session
  /end                                    end the session and show feedback
  /history                                show the transcript so far
  /status                                 check that the backend is reachable
  /help                                   show this help
  /quit                                   exit
Anything else is sent as a chat message; start it with // to send a literal /.";

//=========================================================================================
// Command Parsing
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Login { username: String, password: String },
    Register { username: String, email: String, password: String },
    Logout,
    WhoAmI,
    Verify,
    Start(SessionParams),
    End,
    History,
    Status,
    Help,
    Quit,
    Say(String),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("Unknown command '{0}'. Type /help for a list of commands.")]
    Unknown(String),
    #[error("Usage: {0}")]
    Usage(&'static str),
}

/// Parses one REPL line. Chat text is passed through as typed; a leading `//`
/// sends a message that starts with a literal `/`.
pub fn parse_command(line: &str) -> Result<Command, CommandError> {
    let trimmed = line.trim_start();
    if trimmed.trim_end().is_empty() {
        return Ok(Command::Nothing);
    }
    if let Some(literal) = trimmed.strip_prefix("//") {
        return Ok(Command::Say(format!("/{literal}")));
    }
    let Some(rest) = trimmed.strip_prefix('/') else {
        return Ok(Command::Say(line.to_string()));
    };

    let mut words = rest.split_whitespace();
    let name = words.next().unwrap_or_default();
    let args: Vec<&str> = words.collect();

    let command = match (name, args.as_slice()) {
        ("login", [username, password]) => Command::Login {
            username: username.to_string(),
            password: password.to_string(),
        },
        ("login", _) => return Err(CommandError::Usage("/login <username> <password>")),
        ("register", [username, email, password]) => Command::Register {
            username: username.to_string(),
            email: email.to_string(),
            password: password.to_string(),
        },
        ("register", _) => {
            return Err(CommandError::Usage("/register <username> <email> <password>"))
        }
        ("start", [target, native, level]) => Command::Start(SessionParams {
            target_language: target.to_string(),
            native_language: native.to_string(),
            level: level.to_string(),
        }),
        ("start", _) => return Err(CommandError::Usage("/start <target> <native> <level>")),
        ("logout", []) => Command::Logout,
        ("whoami", []) => Command::WhoAmI,
        ("verify", []) => Command::Verify,
        ("end", []) => Command::End,
        ("history", []) => Command::History,
        ("status", []) => Command::Status,
        ("help", _) => Command::Help,
        ("quit" | "exit", []) => Command::Quit,
        _ => return Err(CommandError::Unknown(format!("/{name}"))),
    };
    Ok(command)
}

/// Turns one line-editor result into a command. Ctrl-C and Ctrl-D quit; any
/// other editor failure is returned to the caller.
pub fn read_command(
    input: Result<String, ReadlineError>,
) -> Result<Result<Command, CommandError>, ReadlineError> {
    match input {
        Ok(line) => Ok(parse_command(&line)),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => Ok(Ok(Command::Quit)),
        Err(e) => Err(e),
    }
}

//=========================================================================================
// Command Execution
//=========================================================================================

/// What the REPL should print after a command, and whether to stop.
#[derive(Debug, Default)]
pub struct Reply {
    pub lines: Vec<String>,
    pub quit: bool,
}

impl Reply {
    fn lines(lines: Vec<String>) -> Self {
        Self { lines, quit: false }
    }

    fn line(line: impl Into<String>) -> Self {
        Self::lines(vec![line.into()])
    }

    fn empty() -> Self {
        Self::default()
    }
}

/// The stores plus the gateway, wired together for one terminal session.
pub struct App {
    auth: AuthStore,
    chat: ChatStore,
    backend: Arc<dyn LearningBackend>,
}

impl App {
    pub fn new(auth: AuthStore, chat: ChatStore, backend: Arc<dyn LearningBackend>) -> Self {
        Self {
            auth,
            chat,
            backend,
        }
    }

    pub fn auth(&self) -> &AuthStore {
        &self.auth
    }

    pub fn chat(&self) -> &ChatStore {
        &self.chat
    }

    /// Greeting shown once at startup.
    pub fn banner(&self) -> String {
        match self.auth.user() {
            Some(user) => format!("Welcome back, {}. Type /help for commands.", user.username),
            None if self.auth.is_authenticated() => {
                "Welcome back. Type /help for commands.".to_string()
            }
            None => "Not logged in. Use /login or /register (type /help for commands).".to_string(),
        }
    }

    /// Runs one command. Store failures have already been shown to the user
    /// by the notifier, so they only end up in the log here.
    pub async fn handle(&mut self, command: Command) -> Reply {
        match command {
            Command::Nothing => Reply::empty(),
            Command::Help => Reply::line(HELP),
            Command::Quit => Reply {
                lines: vec!["Bye!".to_string()],
                quit: true,
            },
            Command::Login { username, password } => {
                match self.auth.login(&username, &password).await {
                    Ok(route) => Reply::line(route_hint(route)),
                    Err(e) => {
                        debug!(error = %e, "login failed");
                        Reply::empty()
                    }
                }
            }
            Command::Register {
                username,
                email,
                password,
            } => match self.auth.register(&username, &email, &password).await {
                Ok(route) => Reply::line(route_hint(route)),
                Err(e) => {
                    debug!(error = %e, "registration failed");
                    Reply::empty()
                }
            },
            Command::Logout => Reply::line(route_hint(self.auth.logout())),
            Command::WhoAmI => Reply::line(match (self.auth.is_authenticated(), self.auth.user()) {
                (true, Some(user)) => format!("Logged in as {}", user.username),
                (true, None) => "Logged in".to_string(),
                (false, _) => "Not logged in".to_string(),
            }),
            Command::Verify => match self.auth.verify().await {
                Ok(Outcome::Done(Verification::Valid)) => Reply::line("Saved login is valid."),
                Ok(Outcome::Done(Verification::Expired)) => Reply::line(route_hint(Route::Login)),
                Ok(Outcome::Skipped(_)) => Reply::empty(),
                Err(e) => {
                    debug!(error = %e, "verification failed");
                    Reply::empty()
                }
            },
            Command::Status => match self.backend.health().await {
                Ok(status) => Reply::line(format!("Backend status: {status}")),
                Err(e) => Reply::line(format!(
                    "Backend unreachable: {}",
                    e.user_message().unwrap_or_else(|| e.to_string())
                )),
            },
            Command::Start(_) | Command::End | Command::History | Command::Say(_)
                if !self.auth.is_authenticated() =>
            {
                Reply::line("Please log in first: /login <username> <password>")
            }
            Command::Start(params) => match self.chat.start_session(&params).await {
                Ok(Outcome::Done(())) => Reply::lines(render_latest(self.chat.session())),
                Ok(Outcome::Skipped(_)) => Reply::empty(),
                Err(e) => {
                    debug!(error = %e, "could not start session");
                    Reply::empty()
                }
            },
            Command::Say(text) => match self.chat.send_message(&text).await {
                Ok(Outcome::Done(())) => Reply::lines(render_latest(self.chat.session())),
                Ok(Outcome::Skipped(_)) => Reply::line("Start a session first: /start <target> <native> <level>"),
                Err(e) => {
                    debug!(error = %e, "message not sent");
                    Reply::empty()
                }
            },
            Command::End => match self.chat.end_session().await {
                Ok(Outcome::Done(feedback)) => Reply::lines(render_feedback(&feedback)),
                Ok(Outcome::Skipped(_)) => Reply::empty(),
                Err(e) => {
                    debug!(error = %e, "could not end session");
                    Reply::empty()
                }
            },
            Command::History => Reply::lines(render_transcript(self.chat.session())),
        }
    }
}

fn route_hint(route: Route) -> &'static str {
    match route {
        Route::Chat => "Start practising with /start <target> <native> <level>.",
        Route::Login => "Log in with /login <username> <password>.",
    }
}

//=========================================================================================
// Rendering
//=========================================================================================

fn render_message(sender: Sender, content: &str, at: &chrono::DateTime<chrono::Utc>) -> String {
    let who = match sender {
        Sender::User => "you",
        Sender::Bot => "bot",
    };
    format!("[{}] {who}: {content}", at.format("%H:%M"))
}

/// The newest bot message followed by the current corrections.
fn render_latest(session: &ChatSession) -> Vec<String> {
    let mut lines: Vec<String> = session
        .messages
        .iter()
        .rev()
        .find(|m| m.sender == Sender::Bot)
        .map(|m| render_message(m.sender, &m.content, &m.sent_at))
        .into_iter()
        .collect();
    lines.push(format!("Corrections: {}", session.corrections));
    lines
}

pub fn render_transcript(session: &ChatSession) -> Vec<String> {
    if !session.is_active() {
        return vec!["Start a session to begin chatting.".to_string()];
    }
    let mut lines: Vec<String> = session
        .messages
        .iter()
        .map(|m| render_message(m.sender, &m.content, &m.sent_at))
        .collect();
    lines.push(format!("Corrections: {}", session.corrections));
    lines
}

pub fn render_feedback(feedback: &str) -> Vec<String> {
    if feedback.trim().is_empty() {
        return vec!["No feedback available.".to_string()];
    }
    std::iter::once("Session feedback:".to_string())
        .chain(feedback.lines().map(|l| format!("  {l}")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryCredentialStore;
    use crate::store::testing::{opening, reply, RecordingNotifier, Scripted, ScriptedBackend};
    use lingua_core::domain::{ChatMessage, CredentialRecord};

    #[test]
    fn plain_text_is_a_chat_message_sent_as_typed() {
        assert_eq!(
            parse_command("  Hola, ¿qué tal?  ").unwrap(),
            Command::Say("  Hola, ¿qué tal?  ".to_string())
        );
        assert_eq!(parse_command("   ").unwrap(), Command::Nothing);
    }

    #[test]
    fn double_slash_sends_a_literal_slash() {
        assert_eq!(
            parse_command("//login no es un comando").unwrap(),
            Command::Say("/login no es un comando".to_string())
        );
        assert_eq!(parse_command("//").unwrap(), Command::Say("/".to_string()));
    }

    #[test]
    fn parses_commands_with_arguments() {
        assert_eq!(
            parse_command("/login bob pw").unwrap(),
            Command::Login {
                username: "bob".into(),
                password: "pw".into()
            }
        );
        assert_eq!(
            parse_command("/start Spanish English beginner").unwrap(),
            Command::Start(SessionParams {
                target_language: "Spanish".into(),
                native_language: "English".into(),
                level: "beginner".into(),
            })
        );
        assert_eq!(parse_command("/exit").unwrap(), Command::Quit);
    }

    #[test]
    fn wrong_arity_reports_usage() {
        assert_eq!(
            parse_command("/login bob").unwrap_err(),
            CommandError::Usage("/login <username> <password>")
        );
        assert!(matches!(
            parse_command("/logout now").unwrap_err(),
            CommandError::Unknown(_)
        ));
        assert!(matches!(
            parse_command("/dance").unwrap_err(),
            CommandError::Unknown(name) if name == "/dance"
        ));
    }

    #[test]
    fn feedback_rendering_handles_empty_text() {
        assert_eq!(render_feedback(""), vec!["No feedback available."]);
        assert_eq!(
            render_feedback("Good.\nPractise verbs."),
            vec!["Session feedback:", "  Good.", "  Practise verbs."]
        );
    }

    #[test]
    fn transcript_lists_every_turn_with_corrections() {
        let session = ChatSession {
            session_id: Some("3".into()),
            messages: vec![ChatMessage::bot("Hola"), ChatMessage::user("Hola!")],
            corrections: "None".into(),
        };
        let lines = render_transcript(&session);
        assert_eq!(lines.len(), 3);
        assert!(lines[0].ends_with("bot: Hola"));
        assert!(lines[1].ends_with("you: Hola!"));
        assert_eq!(lines[2], "Corrections: None");
    }

    fn app(record: CredentialRecord, script: Vec<Scripted>) -> (App, Arc<ScriptedBackend>) {
        let backend = Arc::new(ScriptedBackend::new(script));
        let notifier = Arc::new(RecordingNotifier::default());
        let auth = AuthStore::rehydrate(
            backend.clone(),
            Arc::new(InMemoryCredentialStore::with_record(record)),
            notifier.clone(),
        );
        let chat = ChatStore::new(backend.clone(), notifier);
        (App::new(auth, chat, backend.clone()), backend)
    }

    #[tokio::test]
    async fn chat_commands_require_login() {
        let (mut app, backend) = app(CredentialRecord::default(), vec![]);

        let reply = app.handle(Command::Say("hola".into())).await;

        assert_eq!(reply.lines, vec!["Please log in first: /login <username> <password>"]);
        assert!(backend.calls().is_empty());
    }

    #[tokio::test]
    async fn full_practice_round() {
        let (mut app, backend) = app(
            CredentialRecord::default(),
            vec![
                Scripted::Login(Ok(Some("tok".into()))),
                Scripted::Start(Ok(opening("5", "¡Hola!", None))),
                Scripted::Chat(Ok(reply("¡Muy bien!", Some("Missing accent on 'qué'.")))),
                Scripted::Feedback(Ok("Nice work.".into())),
            ],
        );

        app.handle(parse_command("/login bob pw").unwrap()).await;
        assert_eq!(app.banner(), "Welcome back, bob. Type /help for commands.");

        let started = app
            .handle(parse_command("/start Spanish English beginner").unwrap())
            .await;
        assert!(started.lines[0].ends_with("bot: ¡Hola!"));

        let said = app.handle(parse_command("que tal").unwrap()).await;
        assert!(said.lines[0].ends_with("bot: ¡Muy bien!"));
        assert_eq!(said.lines[1], "Corrections: Missing accent on 'qué'.");
        assert_eq!(app.chat().messages().len(), 3);

        let ended = app.handle(Command::End).await;
        assert_eq!(ended.lines, vec!["Session feedback:", "  Nice work."]);
        assert!(!app.chat().is_session_active());

        assert_eq!(
            backend.calls(),
            vec!["login bob", "start Spanish/English/beginner", "chat 5 que tal", "feedback 5"]
        );
    }

    #[test]
    fn interrupt_and_end_of_input_quit() {
        assert_eq!(read_command(Err(ReadlineError::Eof)).unwrap(), Ok(Command::Quit));
        assert_eq!(
            read_command(Err(ReadlineError::Interrupted)).unwrap(),
            Ok(Command::Quit)
        );
        assert_eq!(
            read_command(Ok("/whoami".to_string())).unwrap(),
            Ok(Command::WhoAmI)
        );
        let broken = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "terminal closed");
        assert!(matches!(
            read_command(Err(ReadlineError::Io(broken))),
            Err(ReadlineError::Io(_))
        ));
    }

    #[tokio::test]
    async fn quit_stops_the_loop() {
        let (mut app, _backend) = app(CredentialRecord::default(), vec![]);
        assert!(app.handle(Command::Quit).await.quit);
        assert!(!app.handle(Command::Help).await.quit);
    }
}
