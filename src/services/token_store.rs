// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Persisted session token slot.
//!
//! The store holds at most one token. It is read from persistence once, when
//! the store is opened; afterwards the in-memory slot is authoritative and
//! every writer (login, logout, 401 handling, failed-init cleanup) goes
//! through the same mutex-guarded commit path.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Token storage errors
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Token storage I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Backing storage for the token slot.
pub trait TokenPersistence: Send + Sync {
    /// Read the persisted token, if any.
    fn load(&self) -> Result<Option<String>, StoreError>;

    /// Replace the persisted token; `None` removes it.
    fn store(&self, token: Option<&str>) -> Result<(), StoreError>;
}

/// Token persisted as a single file; absence of the file means logged out.
#[derive(Debug, Clone)]
pub struct FilePersistence {
    path: PathBuf,
}

impl FilePersistence {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenPersistence for FilePersistence {
    fn load(&self) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(&self.path) {
            Ok(contents) => {
                let token = contents.trim();
                Ok((!token.is_empty()).then(|| token.to_string()))
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn store(&self, token: Option<&str>) -> Result<(), StoreError> {
        match token {
            Some(token) => {
                if let Some(parent) = self.path.parent() {
                    fs::create_dir_all(parent)?;
                }
                // Write-then-rename so a crash never leaves a truncated token.
                let tmp = self.path.with_extension("tmp");
                fs::write(&tmp, token)?;
                fs::rename(&tmp, &self.path)?;
                Ok(())
            }
            None => match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
                Err(e) => Err(e.into()),
            },
        }
    }
}

/// Process-local persistence, used by tests and ephemeral consoles.
#[derive(Debug, Default)]
pub struct MemoryPersistence {
    slot: Mutex<Option<String>>,
    removals: AtomicUsize,
}

impl MemoryPersistence {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
            removals: AtomicUsize::new(0),
        }
    }

    /// Number of times a stored token was actually removed.
    pub fn removals(&self) -> usize {
        self.removals.load(Ordering::SeqCst)
    }
}

impl TokenPersistence for MemoryPersistence {
    fn load(&self) -> Result<Option<String>, StoreError> {
        Ok(lock(&self.slot).clone())
    }

    fn store(&self, token: Option<&str>) -> Result<(), StoreError> {
        let mut slot = lock(&self.slot);
        if token.is_none() && slot.is_some() {
            self.removals.fetch_add(1, Ordering::SeqCst);
        }
        *slot = token.map(str::to_string);
        Ok(())
    }
}

impl<P: TokenPersistence + ?Sized> TokenPersistence for std::sync::Arc<P> {
    fn load(&self) -> Result<Option<String>, StoreError> {
        (**self).load()
    }

    fn store(&self, token: Option<&str>) -> Result<(), StoreError> {
        (**self).store(token)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The single mutable session token slot.
pub struct TokenStore {
    persistence: Box<dyn TokenPersistence>,
    slot: Mutex<Option<String>>,
}

impl TokenStore {
    /// Open the store, reading the persisted token once.
    pub fn open(persistence: impl TokenPersistence + 'static) -> Result<Self, StoreError> {
        let token = persistence.load()?;
        tracing::debug!(present = token.is_some(), "Token store opened");
        Ok(Self {
            persistence: Box::new(persistence),
            slot: Mutex::new(token),
        })
    }

    /// Open a file-backed store at `path`.
    pub fn file(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        Self::open(FilePersistence::new(path))
    }

    /// Empty, process-local store.
    pub fn in_memory() -> Self {
        Self {
            persistence: Box::new(MemoryPersistence::default()),
            slot: Mutex::new(None),
        }
    }

    /// Current token, if one is stored.
    pub fn get(&self) -> Option<String> {
        lock(&self.slot).clone()
    }

    pub fn is_present(&self) -> bool {
        lock(&self.slot).is_some()
    }

    /// Store a new token, replacing any previous one.
    pub fn replace(&self, token: String) -> Result<(), StoreError> {
        let mut slot = lock(&self.slot);
        self.commit(&mut slot, Some(token))
    }

    /// Remove the stored token, returning it if there was one.
    pub fn clear(&self) -> Option<String> {
        let mut slot = lock(&self.slot);
        let previous = slot.clone();
        self.commit_clear(&mut slot);
        previous
    }

    /// Remove the stored token only if it is still `expected`.
    ///
    /// Returns true if this call removed it. A stale credential (one that
    /// was already replaced or cleared) leaves the slot untouched.
    pub fn clear_if(&self, expected: &str) -> bool {
        let mut slot = lock(&self.slot);
        if slot.as_deref() != Some(expected) {
            return false;
        }
        self.commit_clear(&mut slot);
        true
    }

    fn commit_clear(&self, slot: &mut Option<String>) {
        if slot.is_none() {
            return;
        }
        if let Err(e) = self.commit(slot, None) {
            // Local state must not outlive the session even if the file stays behind.
            tracing::warn!(error = %e, "Failed to remove persisted token");
            *slot = None;
        }
    }

    fn commit(&self, slot: &mut Option<String>, next: Option<String>) -> Result<(), StoreError> {
        self.persistence.store(next.as_deref())?;
        *slot = next;
        Ok(())
    }
}

impl std::fmt::Debug for TokenStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenStore")
            .field("present", &self.is_present())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state").join("auth_token");

        let store = TokenStore::file(&path).unwrap();
        assert_eq!(store.get(), None);

        store.replace("t1".to_string()).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "t1");

        // Reopening reads the persisted token.
        let reopened = TokenStore::file(&path).unwrap();
        assert_eq!(reopened.get().as_deref(), Some("t1"));

        assert_eq!(reopened.clear().as_deref(), Some("t1"));
        assert!(!path.exists());
        assert_eq!(reopened.clear(), None);
    }

    #[test]
    fn test_blank_file_is_logged_out() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("auth_token");
        fs::write(&path, "  \n").unwrap();

        let store = TokenStore::file(&path).unwrap();
        assert!(!store.is_present());
    }

    #[test]
    fn test_clear_if_ignores_stale_credential() {
        let persistence = Arc::new(MemoryPersistence::with_token("old"));
        let store = TokenStore::open(persistence.clone()).unwrap();

        store.replace("new".to_string()).unwrap();
        assert!(!store.clear_if("old"));
        assert_eq!(store.get().as_deref(), Some("new"));

        assert!(store.clear_if("new"));
        assert!(!store.clear_if("new"));
        assert_eq!(persistence.removals(), 1);
    }
}
