//! services/client/src/error.rs
//!
//! Errors that end the `lingua` binary. Everything a store operation can hit
//! is shown to the user and the REPL keeps going; only startup and terminal
//! failures reach `main`.

use crate::config::ConfigError;
use lingua_core::ports::PortError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// A required variable is missing or malformed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The HTTP gateway or the credential file could not be set up.
    #[error("Startup error: {0}")]
    Port(#[from] PortError),

    /// The line editor failed to start or to read from the terminal.
    #[error("Terminal error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}
