//! services/client/src/adapters/notifier.rs
//!
//! Terminal implementation of the `Notifier` port: one coloured line per notice.

use colored::Colorize;
use lingua_core::domain::NoticeLevel;
use lingua_core::ports::Notifier;

#[derive(Clone, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    pub fn new() -> Self {
        Self
    }
}

/// Renders a notice the way the terminal shows it, without colour codes.
pub fn format_notice(level: NoticeLevel, text: &str) -> String {
    let tag = match level {
        NoticeLevel::Success => "ok",
        NoticeLevel::Info => "info",
        NoticeLevel::Warning => "warn",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {text}")
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, level: NoticeLevel, text: &str) {
        let line = format_notice(level, text);
        match level {
            NoticeLevel::Success => println!("{}", line.green()),
            NoticeLevel::Info => println!("{}", line.cyan()),
            NoticeLevel::Warning => eprintln!("{}", line.yellow()),
            NoticeLevel::Error => eprintln!("{}", line.red().bold()),
        }
    }
}
