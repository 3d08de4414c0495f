//! Client configuration parsed from environment variables.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::path::PathBuf;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 10;
const FALLBACK_STATE_DIR: &str = ".contactbook";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value}")]
    InvalidValue { var: &'static str, value: String },
}

/// What a failed `register` does to a credential persisted by an earlier session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegisterFailurePolicy {
    /// Clear it, exactly like a failed `login`.
    #[default]
    ClearCredentials,
    /// Leave it in storage; only the in-memory session is reset.
    KeepCredentials,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub state_dir: PathBuf,
    pub connect_timeout_secs: u64,
    /// `None` leaves in-flight requests unbounded.
    pub request_timeout_secs: Option<u64>,
    pub register_failure: RegisterFailurePolicy,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            state_dir: default_state_dir(),
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            request_timeout_secs: None,
            register_failure: RegisterFailurePolicy::default(),
        }
    }
}

impl ClientConfig {
    /// Build typed client config from environment variables.
    ///
    /// Optional:
    /// - `CONTACTBOOK_BASE_URL`: default `http://localhost:8080`
    /// - `CONTACTBOOK_STATE_DIR`: default platform data dir for `contactbook`
    /// - `CONTACTBOOK_CONNECT_TIMEOUT_SECS`: default 10
    /// - `CONTACTBOOK_REQUEST_TIMEOUT_SECS`: default unset (no timeout)
    /// - `CONTACTBOOK_REGISTER_FAILURE`: `clear` (default) or `keep`
    ///
    /// # Errors
    ///
    /// Returns an error if a numeric or enum variable holds an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = normalize_base_url(
            &std::env::var("CONTACTBOOK_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
        );
        let state_dir = std::env::var("CONTACTBOOK_STATE_DIR").map_or_else(|_| default_state_dir(), PathBuf::from);
        let connect_timeout_secs =
            env_parse_u64("CONTACTBOOK_CONNECT_TIMEOUT_SECS")?.unwrap_or(DEFAULT_CONNECT_TIMEOUT_SECS);
        let request_timeout_secs = env_parse_u64("CONTACTBOOK_REQUEST_TIMEOUT_SECS")?;
        let register_failure = parse_register_failure(std::env::var("CONTACTBOOK_REGISTER_FAILURE").ok().as_deref())?;

        Ok(Self { base_url, state_dir, connect_timeout_secs, request_timeout_secs, register_failure })
    }

    /// Return a copy pointing at a different backend.
    #[must_use]
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = normalize_base_url(base_url);
        self
    }
}

fn normalize_base_url(raw: &str) -> String {
    raw.trim().trim_end_matches('/').to_string()
}

fn default_state_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "contactbook")
        .map_or_else(|| PathBuf::from(FALLBACK_STATE_DIR), |dirs| dirs.data_dir().to_path_buf())
}

fn env_parse_u64(key: &'static str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var: key, value: raw }),
        Err(_) => Ok(None),
    }
}

fn parse_register_failure(raw: Option<&str>) -> Result<RegisterFailurePolicy, ConfigError> {
    match raw.map(str::trim).unwrap_or("clear") {
        "clear" => Ok(RegisterFailurePolicy::ClearCredentials),
        "keep" => Ok(RegisterFailurePolicy::KeepCredentials),
        other => Err(ConfigError::InvalidValue { var: "CONTACTBOOK_REGISTER_FAILURE", value: other.to_string() }),
    }
}
