//! Persistent Credential Store: the durable projection of the session.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session manager is the only writer. The HTTP pipeline reads the token
//! on every outgoing request, so a write here is visible to the very next call.
//!
//! ERROR HANDLING
//! ==============
//! Reads fail soft. A present but unparseable user is reported through
//! [`CredentialStore::load`] as `CorruptPersistedState` and through
//! [`CredentialStore::read`] as absent; callers decide whether to clear it.

#[cfg(test)]
#[path = "credential_test.rs"]
mod credential_test;

use std::sync::Arc;

use tracing::warn;

use super::KeyValueStorage;
use crate::error::ClientError;
use crate::net::types::User;

/// Storage key holding the raw bearer token.
pub const TOKEN_KEY: &str = "jwtToken";
/// Storage key holding the JSON-serialized [`User`].
pub const USER_KEY: &str = "user";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistedCredential {
    pub token: String,
    pub user: User,
}

#[derive(Clone)]
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStorage>,
}

impl CredentialStore {
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self { storage }
    }

    /// Current bearer token, ignoring the user key. Empty tokens read as absent.
    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.storage.get_item(TOKEN_KEY).filter(|t| !t.is_empty())
    }

    /// Both halves of the credential, or an error if the stored user is malformed.
    ///
    /// Returns `Ok(None)` when either key is missing.
    ///
    /// # Errors
    ///
    /// Returns `CorruptPersistedState` if the user key holds something other than a `User`.
    pub fn load(&self) -> Result<Option<PersistedCredential>, ClientError> {
        let Some(token) = self.token() else {
            return Ok(None);
        };
        let Some(raw_user) = self.storage.get_item(USER_KEY) else {
            return Ok(None);
        };
        let user = serde_json::from_str::<User>(&raw_user)
            .map_err(|e| ClientError::CorruptPersistedState(format!("stored user: {e}")))?;
        Ok(Some(PersistedCredential { token, user }))
    }

    /// Soft read: corruption is logged and reported as absent.
    #[must_use]
    pub fn read(&self) -> Option<PersistedCredential> {
        match self.load() {
            Ok(credential) => credential,
            Err(e) => {
                warn!(error = %e, "ignoring unreadable persisted credential");
                None
            }
        }
    }

    /// Persist both keys. If the user write fails the token key is restored
    /// to its previous value, leaving the prior credential as it was.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if either key cannot be written.
    pub fn write(&self, credential: &PersistedCredential) -> Result<(), ClientError> {
        let user = serde_json::to_string(&credential.user).map_err(|e| ClientError::Storage(e.to_string()))?;
        let previous_token = self.storage.get_item(TOKEN_KEY);
        self.storage.set_item(TOKEN_KEY, &credential.token)?;
        if let Err(e) = self.storage.set_item(USER_KEY, &user) {
            self.restore_token(previous_token.as_deref());
            return Err(e.into());
        }
        Ok(())
    }

    fn restore_token(&self, previous: Option<&str>) {
        let restored = match previous {
            Some(token) => self.storage.set_item(TOKEN_KEY, token),
            None => self.storage.remove_item(TOKEN_KEY),
        };
        if let Err(e) = restored {
            warn!(error = %e, "failed to roll back token after user write failed; clearing credential");
            self.clear();
        }
    }

    /// Remove both keys. Best effort: failures are logged, never returned.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove_item(key) {
                warn!(error = %e, key, "failed to clear persisted credential key");
            }
        }
    }
}
