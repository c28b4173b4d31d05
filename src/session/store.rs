//! Token persistence
//!
//! The bearer token outlives the process through a `TokenStore`. The CLI
//! keeps it in a small JSON file; tests use the in-memory store.

use super::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Pluggable storage for the persisted token
pub trait TokenStore: Send + Sync {
    /// Stored token, if any
    fn load(&self) -> SessionResult<Option<String>>;

    /// Replace the stored token
    fn save(&self, token: &str) -> SessionResult<()>;

    /// Forget the stored token. Clearing an empty store is not an error.
    fn clear(&self) -> SessionResult<()>;
}

/// Process-local token store
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with a token
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Mutex::new(Some(token.into())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> SessionResult<Option<String>> {
        let token = self
            .token
            .lock()
            .map_err(|e| SessionError::Lock(e.to_string()))?;
        Ok(token.clone())
    }

    fn save(&self, token: &str) -> SessionResult<()> {
        let mut slot = self
            .token
            .lock()
            .map_err(|e| SessionError::Lock(e.to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> SessionResult<()> {
        let mut slot = self
            .token
            .lock()
            .map_err(|e| SessionError::Lock(e.to_string()))?;
        *slot = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct TokenFile {
    token: String,
}

/// Token kept in a JSON file on disk
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write to a sibling `.tmp` file, then rename over the target
    fn atomic_write(path: &Path, contents: &[u8]) -> SessionResult<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = path.with_extension("tmp");
        fs::write(&tmp_path, contents)?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(tmp_path, path)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> SessionResult<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&self.path)?;

        // A corrupt file is treated as "logged out" rather than a hard failure
        match serde_json::from_str::<TokenFile>(&content) {
            Ok(file) if !file.token.is_empty() => Ok(Some(file.token)),
            Ok(_) => Ok(None),
            Err(e) => {
                tracing::warn!(path = ?self.path, error = %e, "Ignoring unreadable token file");
                Ok(None)
            }
        }
    }

    fn save(&self, token: &str) -> SessionResult<()> {
        let json = serde_json::to_string(&TokenFile {
            token: token.to_string(),
        })?;
        Self::atomic_write(&self.path, json.as_bytes())
    }

    fn clear(&self) -> SessionResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
