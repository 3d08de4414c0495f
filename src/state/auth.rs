//! Session State Manager: auth state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Owned by the application root and handed to consumers by reference. The
//! Route Guard and the CLI read snapshots; every transition is also published
//! on a `watch` channel so long-lived consumers can re-evaluate on change.
//!
//! DESIGN
//! ======
//! States are `Loading -> {Anonymous, Authenticated}` at bootstrap, then
//! `Anonymous <-> Authenticated` via login/register/logout. `Loading` is never
//! re-entered. The user and token live together in one `Option`, so a session
//! with a token but no user (or the reverse) cannot be constructed.
//!
//! No lock spans a network call. Two operations racing each other resolve as
//! last-write-wins, both in memory and in the credential store.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, error, info, warn};

use crate::config::{ClientConfig, RegisterFailurePolicy};
use crate::error::ClientError;
use crate::net::api::ApiClient;
use crate::net::types::{AuthResponse, ChangePasswordData, LoginCredentials, RegisterData, User};
use crate::storage::{CredentialStore, KeyValueStorage, PersistedCredential};

const LOGIN_PATH: &str = "/user/login";
const SIGNUP_PATH: &str = "/user/signup";
const CHANGE_PASSWORD_PATH: &str = "/user/change-password";

// =============================================================================
// AUTH STATE
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase {
    Loading,
    Anonymous,
    Authenticated,
}

#[derive(Clone, Debug, PartialEq, Eq)]
struct Session {
    user: User,
    token: String,
}

/// Snapshot of the authentication state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    session: Option<Session>,
    loading: bool,
}

impl Default for AuthState {
    fn default() -> Self {
        Self::loading()
    }
}

impl AuthState {
    /// Initial state before the credential store has been read.
    #[must_use]
    pub fn loading() -> Self {
        Self { session: None, loading: true }
    }

    #[must_use]
    pub fn anonymous() -> Self {
        Self { session: None, loading: false }
    }

    #[must_use]
    pub fn authenticated(user: User, token: String) -> Self {
        Self { session: Some(Session { user, token }), loading: false }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.session.as_ref().map(|s| s.token.as_str())
    }

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        match (&self.session, self.loading) {
            (_, true) => AuthPhase::Loading,
            (Some(_), false) => AuthPhase::Authenticated,
            (None, false) => AuthPhase::Anonymous,
        }
    }
}

// =============================================================================
// SESSION MANAGER
// =============================================================================

pub struct SessionManager {
    api: Arc<ApiClient>,
    credentials: CredentialStore,
    register_failure: RegisterFailurePolicy,
    state: watch::Sender<AuthState>,
}

impl SessionManager {
    /// A manager in the `Loading` state. Call [`SessionManager::bootstrap`] next.
    #[must_use]
    pub fn new(api: Arc<ApiClient>, credentials: CredentialStore, register_failure: RegisterFailurePolicy) -> Self {
        let (state, _) = watch::channel(AuthState::loading());
        Self { api, credentials, register_failure, state }
    }

    /// Wire a credential store and HTTP pipeline over `storage` from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ClientConfig, storage: Arc<dyn KeyValueStorage>) -> Result<Self, ClientError> {
        let credentials = CredentialStore::new(storage);
        let api = Arc::new(ApiClient::new(config, credentials.clone())?);
        Ok(Self::new(api, credentials, config.register_failure))
    }

    /// The shared pipeline, for collaborators such as the contact service.
    #[must_use]
    pub fn api(&self) -> Arc<ApiClient> {
        self.api.clone()
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.state.borrow().clone()
    }

    /// Receiver that observes every subsequent state change.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.state.subscribe()
    }

    fn set_state(&self, next: AuthState) {
        self.state.send_replace(next);
    }

    /// Restore the session from the credential store. Never fails outward.
    ///
    /// A missing, partial, or corrupt credential is cleared and the session
    /// becomes anonymous. Only the first call has any effect.
    pub fn bootstrap(&self) {
        if !self.state.borrow().is_loading() {
            debug!("bootstrap already ran; ignoring");
            return;
        }

        debug!("checking credential store for auth data");
        let next = match self.credentials.load() {
            Ok(Some(PersistedCredential { token, user })) => {
                info!(user_id = user.id, "restored session from credential store");
                self.api.set_default_token(&token);
                AuthState::authenticated(user, token)
            }
            Ok(None) => {
                debug!("no auth data in credential store");
                self.credentials.clear();
                AuthState::anonymous()
            }
            Err(e) => {
                warn!(error = %e, "discarding corrupt credential");
                self.credentials.clear();
                AuthState::anonymous()
            }
        };
        self.set_state(next);
    }

    /// Log in via `POST /user/login`.
    ///
    /// On failure the stored credential is cleared and the session is anonymous.
    ///
    /// # Errors
    ///
    /// Returns `Authentication` when the backend rejects the credentials,
    /// `Transport` when it is unreachable, or `Storage` if the credential
    /// cannot be persisted.
    pub async fn login(&self, credentials: &LoginCredentials) -> Result<User, ClientError> {
        self.authenticate("login", LOGIN_PATH, credentials, true).await
    }

    /// Register via `POST /user/signup`; same contract as [`SessionManager::login`].
    ///
    /// Whether a failure also clears a previously stored credential is
    /// decided by the configured [`RegisterFailurePolicy`].
    ///
    /// # Errors
    ///
    /// See [`SessionManager::login`].
    pub async fn register(&self, data: &RegisterData) -> Result<User, ClientError> {
        let clear = self.register_failure == RegisterFailurePolicy::ClearCredentials;
        self.authenticate("register", SIGNUP_PATH, data, clear).await
    }

    async fn authenticate<B>(&self, op: &'static str, path: &str, body: &B, clear_on_failure: bool) -> Result<User, ClientError>
    where
        B: Serialize + ?Sized,
    {
        info!(op, "attempting authentication");
        let result = match self.api.post::<B, AuthResponse>(path, body).await {
            Ok(response) => self.establish(response),
            Err(e) => Err(e.into_authentication()),
        };

        match result {
            Ok(user) => {
                info!(op, user_id = user.id, "authentication succeeded");
                Ok(user)
            }
            Err(e) => {
                error!(op, error = %e, "authentication failed");
                if clear_on_failure {
                    self.credentials.clear();
                    self.api.clear_default_token();
                }
                self.set_state(AuthState::anonymous());
                Err(e)
            }
        }
    }

    fn establish(&self, response: AuthResponse) -> Result<User, ClientError> {
        let AuthResponse { token, user } = response;
        if token.is_empty() {
            return Err(ClientError::Decode("auth response carried an empty token".into()));
        }
        let credential = PersistedCredential { token, user };
        self.credentials.write(&credential)?;
        self.api.set_default_token(&credential.token);

        let PersistedCredential { token, user } = credential;
        self.set_state(AuthState::authenticated(user.clone(), token));
        Ok(user)
    }

    /// Forget the session locally. Idempotent and infallible.
    pub fn logout(&self) {
        info!("logging out");
        self.credentials.clear();
        self.api.clear_default_token();
        self.set_state(AuthState::anonymous());
    }

    /// Change the password via `POST /user/change-password`.
    ///
    /// The session and stored credential are untouched either way.
    ///
    /// # Errors
    ///
    /// Returns `Unauthenticated` without any network call when no session is
    /// active; otherwise `Authentication` or `Transport` from the backend call.
    pub async fn change_password(&self, data: &ChangePasswordData) -> Result<(), ClientError> {
        if !self.state.borrow().is_authenticated() {
            warn!("password change requested without a session");
            return Err(ClientError::Unauthenticated);
        }

        info!("attempting password change");
        match self.api.post_discard(CHANGE_PASSWORD_PATH, data).await {
            Ok(()) => {
                info!("password change succeeded");
                Ok(())
            }
            Err(e) => {
                let e = e.into_authentication();
                error!(error = %e, "password change failed");
                Err(e)
            }
        }
    }
}
