//! Client error taxonomy.
//!
//! DESIGN
//! ======
//! Every fallible session or contact operation returns `ClientError`. Transport
//! failures keep the underlying `reqwest::Error` as their source; backend
//! rejections carry the HTTP status and the backend's `message` text so the
//! presentation layer can show it verbatim.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Grepable error codes plus a retry hint, shared by every client error.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

/// Errors produced by the session core, the HTTP pipeline and the contact service.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request never produced an HTTP response (connect, DNS, TLS, reset).
    #[error("transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// Login, signup or password change was rejected by the backend.
    #[error("authentication failed ({status}): {message}")]
    Authentication { status: u16, message: String },

    /// Any other non-success response.
    #[error("request failed ({status}): {message}")]
    Api { status: u16, message: String },

    /// A client-side form rule was violated; nothing was sent.
    #[error("{0}")]
    Validation(String),

    /// The locally stored credential could not be parsed.
    #[error("corrupt persisted state: {0}")]
    CorruptPersistedState(String),

    /// The operation requires an authenticated session.
    #[error("user is not authenticated")]
    Unauthenticated,

    /// A success response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// Durable storage could not be written.
    #[error("storage error: {0}")]
    Storage(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ClientError {
    /// HTTP status carried by backend rejections, if any.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Re-tag a backend rejection from an auth endpoint as an authentication failure.
    #[must_use]
    pub(crate) fn into_authentication(self) -> Self {
        match self {
            Self::Api { status, message } => Self::Authentication { status, message },
            other => other,
        }
    }
}

impl ErrorCode for ClientError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Transport(_) => "E_TRANSPORT",
            Self::Authentication { .. } => "E_AUTHENTICATION",
            Self::Api { .. } => "E_API",
            Self::Validation(_) => "E_VALIDATION",
            Self::CorruptPersistedState(_) => "E_CORRUPT_PERSISTED_STATE",
            Self::Unauthenticated => "E_UNAUTHENTICATED",
            Self::Decode(_) => "E_DECODE",
            Self::Storage(_) => "E_STORAGE",
            Self::HttpClientBuild(_) => "E_HTTP_CLIENT_BUILD",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Api { status: 429 | 500..=599, .. })
    }
}
