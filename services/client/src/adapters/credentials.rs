//! services/client/src/adapters/credentials.rs
//!
//! Credential persistence adapters implementing the `CredentialStore` port.
//!
//! `FileCredentialStore` keeps the token and username in a small JSON file
//! (by default `~/.config/lingua/credentials.json`) so they survive restarts.
//! `InMemoryCredentialStore` keeps them for the life of the process only.

use lingua_core::domain::CredentialRecord;
use lingua_core::ports::{CredentialStore, PortError, PortResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// On-disk shape of the credential file.
#[derive(Serialize, Deserialize, Default, Debug)]
struct CredentialFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    username: Option<String>,
}

impl From<CredentialFile> for CredentialRecord {
    fn from(file: CredentialFile) -> Self {
        CredentialRecord {
            token: file.token,
            username: file.username,
        }
    }
}

//=========================================================================================
// File-backed Store
//=========================================================================================

/// Stores credentials as JSON in a single file.
///
/// Every write replaces the whole file through a temporary sibling and a
/// rename, so a crash never leaves a half-written record behind. On Unix the
/// file is created with mode `0600`.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Uses the platform config directory: `<config_dir>/lingua/credentials.json`.
    pub fn new() -> PortResult<Self> {
        let path = Self::default_path()?;
        Ok(Self { path })
    }

    /// Uses a custom path (for tests and the `LINGUA_CREDENTIALS_PATH` override).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_path() -> PortResult<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("lingua").join("credentials.json"))
            .ok_or_else(|| PortError::Storage("could not determine config directory".to_string()))
    }

    fn read(&self) -> PortResult<CredentialFile> {
        if !self.path.exists() {
            return Ok(CredentialFile::default());
        }
        let content = fs::read_to_string(&self.path).map_err(|e| {
            PortError::Storage(format!("failed to read {}: {e}", self.path.display()))
        })?;
        if content.trim().is_empty() {
            return Ok(CredentialFile::default());
        }
        serde_json::from_str(&content).map_err(|e| {
            PortError::Storage(format!("failed to parse {}: {e}", self.path.display()))
        })
    }

    fn write(&self, file: &CredentialFile) -> PortResult<()> {
        let storage_err =
            |e: std::io::Error| PortError::Storage(format!("failed to write {}: {e}", self.path.display()));

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(storage_err)?;
        }

        let json = serde_json::to_string_pretty(file)
            .map_err(|e| PortError::Storage(format!("failed to serialize credentials: {e}")))?;

        let tmp_path = self.path.with_extension("json.tmp");
        {
            let mut tmp = open_private(&tmp_path).map_err(storage_err)?;
            tmp.write_all(json.as_bytes()).map_err(storage_err)?;
            tmp.sync_all().map_err(storage_err)?;
        }
        fs::rename(&tmp_path, &self.path).map_err(storage_err)?;
        debug!(path = %self.path.display(), "credential file updated");
        Ok(())
    }

    fn update<F>(&self, change: F) -> PortResult<()>
    where
        F: FnOnce(&mut CredentialFile),
    {
        let mut file = self.read()?;
        change(&mut file);
        self.write(&file)
    }
}

#[cfg(unix)]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    use std::os::unix::fs::OpenOptionsExt;
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> std::io::Result<fs::File> {
    fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> PortResult<CredentialRecord> {
        self.read().map(CredentialRecord::from)
    }

    fn save_token(&self, token: &str) -> PortResult<()> {
        self.update(|file| file.token = Some(token.to_string()))
    }

    fn clear_token(&self) -> PortResult<()> {
        if !self.path.exists() {
            return Ok(());
        }
        self.update(|file| file.token = None)
    }

    fn save_username(&self, username: &str) -> PortResult<()> {
        self.update(|file| file.username = Some(username.to_string()))
    }
}

//=========================================================================================
// In-memory Store
//=========================================================================================

/// Keeps credentials in process memory only.
#[derive(Default)]
pub struct InMemoryCredentialStore {
    record: Mutex<CredentialRecord>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts from an existing record, as if it had been persisted earlier.
    pub fn with_record(record: CredentialRecord) -> Self {
        Self {
            record: Mutex::new(record),
        }
    }

    fn with_lock<T>(&self, f: impl FnOnce(&mut CredentialRecord) -> T) -> PortResult<T> {
        let mut guard = self
            .record
            .lock()
            .map_err(|_| PortError::Storage("credential lock poisoned".to_string()))?;
        Ok(f(&mut guard))
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn load(&self) -> PortResult<CredentialRecord> {
        self.with_lock(|record| record.clone())
    }

    fn save_token(&self, token: &str) -> PortResult<()> {
        self.with_lock(|record| record.token = Some(token.to_string()))
    }

    fn clear_token(&self) -> PortResult<()> {
        self.with_lock(|record| record.token = None)
    }

    fn save_username(&self, username: &str) -> PortResult<()> {
        self.with_lock(|record| record.username = Some(username.to_string()))
    }
}
