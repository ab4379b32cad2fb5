//! services/client/src/bin/lingua.rs

use client_lib::{
    adapters::{ConsoleNotifier, FileCredentialStore, HttpGateway, InMemoryCredentialStore},
    cli::{read_command, App},
    config::Config,
    error::ClientError,
    store::{AuthStore, ChatStore},
};
use colored::Colorize;
use lingua_core::ports::{CredentialStore, LearningBackend, Notifier};
use rustyline::DefaultEditor;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ClientError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Config::from_env()?;
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    info!(api_url = %config.api_url, "Configuration loaded.");

    // --- 2. Initialize Adapters ---
    let backend: Arc<dyn LearningBackend> = Arc::new(HttpGateway::new(config.api_url.clone())?);
    let credentials: Arc<dyn CredentialStore> = if config.persist_credentials {
        let store = match &config.credentials_path {
            Some(path) => FileCredentialStore::with_path(path.clone()),
            None => FileCredentialStore::new()?,
        };
        info!(path = %store.path().display(), "Using credential file.");
        Arc::new(store)
    } else {
        info!("Credential persistence disabled; login lasts for this run only.");
        Arc::new(InMemoryCredentialStore::new())
    };
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier::new());

    // --- 3. Build the Stores (rehydrating any saved login) ---
    let auth = AuthStore::rehydrate(backend.clone(), credentials, notifier.clone());
    let chat = ChatStore::new(backend.clone(), notifier);
    let mut app = App::new(auth, chat, backend);

    // --- 4. Run the REPL ---
    let mut editor = DefaultEditor::new()?;
    println!("{}", app.banner());
    loop {
        let prompt = match app.auth().user() {
            Some(user) => format!("{}> ", user.username.green()),
            None => "> ".to_string(),
        };

        // The editor blocks on the terminal; keep the runtime's other workers free.
        let input = tokio::task::block_in_place(|| editor.readline(&prompt));
        if let Ok(line) = &input {
            if !line.trim().is_empty() {
                let _ = editor.add_history_entry(line.as_str());
            }
        }

        let command = match read_command(input)? {
            Ok(command) => command,
            Err(e) => {
                println!("{e}");
                continue;
            }
        };

        let reply = app.handle(command).await;
        for line in &reply.lines {
            println!("{line}");
        }
        if reply.quit {
            break;
        }
    }

    info!("Exiting.");
    Ok(())
}
