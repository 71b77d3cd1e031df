//! Token storage.
//!
//! The store is a pure key-value holder for the access/refresh token pair;
//! it performs no validation on token contents. Writes are visible to
//! subsequent reads immediately.

use std::fs;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::Result;

const ACCESS_TOKEN_FILE: &str = "access_token";

/// Holder for the current access/refresh token pair.
///
/// The access token outlives the process where the implementation persists
/// it; the refresh token is always scoped to the running session.
pub trait CredentialStore: Send + Sync {
    fn access(&self) -> Option<String>;
    fn set_access(&self, token: &str);
    fn clear_access(&self);

    fn refresh(&self) -> Option<String>;
    fn set_refresh(&self, token: &str);
    fn clear_refresh(&self);

    fn clear_all(&self) {
        self.clear_access();
        self.clear_refresh();
    }
}

/// In-memory store. Both tokens vanish when the store is dropped.
#[derive(Default)]
pub struct MemoryCredentialStore {
    access: RwLock<Option<String>>,
    refresh: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn access(&self) -> Option<String> {
        self.access.read().expect("access lock poisoned").clone()
    }

    fn set_access(&self, token: &str) {
        *self.access.write().expect("access lock poisoned") = Some(token.to_string());
    }

    fn clear_access(&self) {
        *self.access.write().expect("access lock poisoned") = None;
    }

    fn refresh(&self) -> Option<String> {
        self.refresh.read().expect("refresh lock poisoned").clone()
    }

    fn set_refresh(&self, token: &str) {
        *self.refresh.write().expect("refresh lock poisoned") = Some(token.to_string());
    }

    fn clear_refresh(&self) {
        *self.refresh.write().expect("refresh lock poisoned") = None;
    }
}

/// File-backed store.
///
/// The access token is persisted under the state directory so it survives
/// process restarts, mirroring a browser cookie. The refresh token is held
/// in memory only and ends with the session. Persistence failures are
/// logged and the in-memory copy stays authoritative for the session.
pub struct FileCredentialStore {
    dir: PathBuf,
    access: RwLock<Option<String>>,
    refresh: RwLock<Option<String>>,
}

impl FileCredentialStore {
    /// Open the default store under `~/.scamscope`.
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir().ok_or_else(|| {
            std::io::Error::new(std::io::ErrorKind::NotFound, "could not find home directory")
        })?;
        Ok(Self::with_dir(home.join(".scamscope")))
    }

    /// Open a store rooted at an explicit directory.
    pub fn with_dir(dir: PathBuf) -> Self {
        let access = fs::read_to_string(dir.join(ACCESS_TOKEN_FILE))
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            dir,
            access: RwLock::new(access),
            refresh: RwLock::new(None),
        }
    }

    fn persist_access(&self, token: Option<&str>) {
        let path = self.dir.join(ACCESS_TOKEN_FILE);
        let outcome = match token {
            Some(token) => fs::create_dir_all(&self.dir).and_then(|_| fs::write(&path, token)),
            None if path.exists() => fs::remove_file(&path),
            None => Ok(()),
        };
        if let Err(e) = outcome {
            tracing::warn!(path = %path.display(), error = %e, "failed to persist access token");
        }
    }
}

impl CredentialStore for FileCredentialStore {
    fn access(&self) -> Option<String> {
        self.access.read().expect("access lock poisoned").clone()
    }

    fn set_access(&self, token: &str) {
        *self.access.write().expect("access lock poisoned") = Some(token.to_string());
        self.persist_access(Some(token));
    }

    fn clear_access(&self) {
        *self.access.write().expect("access lock poisoned") = None;
        self.persist_access(None);
    }

    fn refresh(&self) -> Option<String> {
        self.refresh.read().expect("refresh lock poisoned").clone()
    }

    fn set_refresh(&self, token: &str) {
        *self.refresh.write().expect("refresh lock poisoned") = Some(token.to_string());
    }

    fn clear_refresh(&self) {
        *self.refresh.write().expect("refresh lock poisoned") = None;
    }
}
