//! Durable key-value storage for session data.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session core only needs the small string-keyed API a browser storage
//! area offers. `KeyValueStorage` captures that surface so the credential
//! store can run against a JSON file on disk (`FileStorage`) or a process-local
//! map (`MemoryStorage`) without knowing which.

pub mod credential;
pub mod file;


use std::collections::HashMap;
use std::sync::Mutex;

pub use credential::{CredentialStore, PersistedCredential};
pub use file::FileStorage;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("storage encode failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl From<StorageError> for crate::error::ClientError {
    fn from(e: StorageError) -> Self {
        Self::Storage(e.to_string())
    }
}

/// String-keyed storage that survives for the lifetime of its backing medium.
pub trait KeyValueStorage: Send + Sync {
    /// Value stored under `key`, if any. Unreadable media read as empty.
    fn get_item(&self, key: &str) -> Option<String>;

    /// Store `value` under `key`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    /// Remove `key`. Removing a missing key is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing medium cannot be written.
    fn remove_item(&self, key: &str) -> Result<(), StorageError>;
}

/// Process-local storage. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.items
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .remove(key);
        Ok(())
    }
}
