//! Storage for the session's bearer token

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

use tracing::warn;

/// Key the bearer token is stored under
pub const CREDENTIAL_KEY: &str = "luxe_cx_token";

/// Where the client keeps the current bearer token
///
/// Exactly one token is active at a time. Storing overwrites, clearing
/// removes; a store that has never been written reads as `None`.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialStore: Send + Sync {
    /// The current token, if any
    fn load(&self) -> Option<String>;

    /// Replace the current token
    fn store(&self, token: &str) -> io::Result<()>;

    /// Remove the current token
    fn clear(&self) -> io::Result<()>;
}

/// Process-local token storage
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a token already present
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn store(&self, token: &str) -> io::Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Token storage backed by a single file named after [`CREDENTIAL_KEY`]
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    /// Store the token inside `dir`
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            path: dir.as_ref().join(CREDENTIAL_KEY),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Option<String> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                (!token.is_empty()).then(|| token.to_string())
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => None,
            Err(err) => {
                warn!(path = %self.path.display(), error = %err, "Failed to read stored credential");
                None
            }
        }
    }

    fn store(&self, token: &str) -> io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_lifecycle() {
        let store = MemoryCredentialStore::new();
        assert_eq!(store.load(), None);

        store.store("t1").unwrap();
        store.store("t2").unwrap();
        assert_eq!(store.load().as_deref(), Some("t2"));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path().join("state"));
        assert_eq!(store.load(), None);

        store.store("abc.def").unwrap();
        assert!(store.path().ends_with(CREDENTIAL_KEY));
        assert_eq!(store.load().as_deref(), Some("abc.def"));

        store.clear().unwrap();
        assert_eq!(store.load(), None);
        // Clearing twice is fine
        store.clear().unwrap();
    }

    #[test]
    fn test_file_store_treats_blank_file_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileCredentialStore::new(dir.path());
        std::fs::write(store.path(), "\n").unwrap();
        assert_eq!(store.load(), None);
    }
}
