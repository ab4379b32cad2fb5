pub mod domain;
pub mod ports;

pub use domain::{
    AuthState, BotReply, ChatMessage, ChatSession, CredentialRecord, NoticeLevel, Sender,
    SessionOpening, SessionParams, User,
};
pub use ports::{CredentialStore, LearningBackend, Notifier, PortError, PortResult};
