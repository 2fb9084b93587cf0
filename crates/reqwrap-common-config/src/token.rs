//! Persistent client token storage.
//!
//! The request executor only ever reads the token; acquiring and writing it
//! belongs to the login flow of the application.

use crate::env::{vars, Environment};
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

/// Read-only access to the stored auth token.
pub trait TokenStore: Send + Sync + fmt::Debug {
    /// Current token, `None` when nothing is stored.
    fn token(&self) -> Option<String>;
}

/// In-memory token store.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: RwLock<Option<String>>,
}

impl MemoryTokenStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding `token`.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }

    /// Replace the stored token.
    pub fn set(&self, token: impl Into<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = Some(token.into());
        }
    }

    /// Remove the stored token.
    pub fn clear(&self) {
        if let Ok(mut guard) = self.token.write() {
            *guard = None;
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn token(&self) -> Option<String> {
        self.token.read().ok().and_then(|guard| guard.clone())
    }
}

impl fmt::Debug for MemoryTokenStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let present = self.token().is_some();
        f.debug_struct("MemoryTokenStore")
            .field("token", &if present { "[REDACTED]" } else { "<none>" })
            .finish()
    }
}

/// Token persisted in a plain file.
///
/// The file is read on every lookup so a token written by another process
/// is picked up by the next call.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Store at `REQWRAP_TOKEN_FILE`, if set.
    pub fn from_env() -> Option<Self> {
        Environment::get(vars::REQWRAP_TOKEN_FILE).map(Self::new)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn token(&self) -> Option<String> {
        let contents = std::fs::read_to_string(&self.path).ok()?;
        let token = contents.trim();
        (!token.is_empty()).then(|| token.to_string())
    }
}

/// Token taken from the `REQWRAP_TOKEN` environment variable.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvTokenStore;

impl TokenStore for EnvTokenStore {
    fn token(&self) -> Option<String> {
        Environment::get(vars::REQWRAP_TOKEN).filter(|t| !t.is_empty())
    }
}
