//! HTTP Request Pipeline shared by the session core and the contact service.
//!
//! SYSTEM CONTEXT
//! ==============
//! One `ApiClient` is built per process with a fixed base URL and JSON content
//! type. Every outgoing request is assembled by [`ApiClient::build_request`],
//! which applies the client-level default `Authorization` header (set on
//! login, cleared on logout) and then runs each [`RequestInterceptor`].
//!
//! DESIGN
//! ======
//! The bearer interceptor re-reads the token from the [`CredentialStore`] for
//! every request instead of caching it, so a login or logout takes effect on
//! the very next call without rebuilding the client. Interceptors run after
//! the default header and win when both are present.
//!
//! ERROR HANDLING
//! ==============
//! No retries and no backoff. Transport failures surface as
//! `ClientError::Transport` carrying the original `reqwest::Error`; non-2xx
//! responses surface as `ClientError::Api` with the backend's `message`.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::RwLock;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{Method, Request};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::types::ErrorBody;
use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::storage::CredentialStore;

// =============================================================================
// INTERCEPTORS
// =============================================================================

/// Hook run against every fully built request just before it is sent.
pub trait RequestInterceptor: Send + Sync {
    fn intercept(&self, request: &mut Request);
}

/// Injects `Authorization: Bearer <token>` from the credential store, if a token is stored.
pub struct BearerTokenInterceptor {
    credentials: CredentialStore,
}

impl BearerTokenInterceptor {
    #[must_use]
    pub fn new(credentials: CredentialStore) -> Self {
        Self { credentials }
    }
}

impl RequestInterceptor for BearerTokenInterceptor {
    fn intercept(&self, request: &mut Request) {
        let Some(token) = self.credentials.token() else {
            return;
        };
        match bearer_header(&token) {
            Ok(value) => {
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => warn!(error = %e, "stored token is not a valid header value; sending without it"),
        }
    }
}

fn bearer_header(token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
    value.set_sensitive(true);
    Ok(value)
}

// =============================================================================
// CLIENT
// =============================================================================

pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    default_authorization: RwLock<Option<HeaderValue>>,
    interceptors: Vec<Box<dyn RequestInterceptor>>,
}

impl ApiClient {
    /// Build the shared client with the bearer interceptor bound to `credentials`.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client fails to build.
    pub fn new(config: &ClientConfig, credentials: CredentialStore) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs));
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ClientError::HttpClientBuild(e.to_string()))?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            default_authorization: RwLock::new(None),
            interceptors: vec![Box::new(BearerTokenInterceptor::new(credentials))],
        })
    }

    /// Append another interceptor; it runs after the ones already installed.
    #[must_use]
    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Install `Bearer <token>` as the client-level default header.
    pub fn set_default_token(&self, token: &str) {
        let value = match bearer_header(token) {
            Ok(value) => Some(value),
            Err(e) => {
                warn!(error = %e, "token is not a valid header value; default header cleared");
                None
            }
        };
        *self
            .default_authorization
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = value;
    }

    /// Drop the client-level default header.
    pub fn clear_default_token(&self) {
        *self
            .default_authorization
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner) = None;
    }

    #[must_use]
    pub fn default_authorization(&self) -> Option<HeaderValue> {
        self.default_authorization
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Assemble a request: URL, query, JSON body, default header, then interceptors.
    ///
    /// # Errors
    ///
    /// Returns `Transport` if reqwest cannot form the request (bad URL, unencodable body).
    pub fn build_request<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Option<&B>,
    ) -> Result<Request, ClientError>
    where
        B: Serialize + ?Sized,
    {
        let mut builder = self.http.request(method, self.url(path));
        if !query.is_empty() {
            builder = builder.query(query);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }
        let mut request = builder.build().map_err(ClientError::Transport)?;

        if let Some(value) = self.default_authorization() {
            request.headers_mut().insert(AUTHORIZATION, value);
        }
        for interceptor in &self.interceptors {
            interceptor.intercept(&mut request);
        }
        Ok(request)
    }

    /// Send a built request and return the raw success body.
    ///
    /// # Errors
    ///
    /// Returns `Transport` when no response arrives and `Api` on a non-2xx status.
    pub async fn execute(&self, request: Request) -> Result<String, ClientError> {
        let method = request.method().clone();
        let path = request.url().path().to_string();

        let response = self.http.execute(request).await.map_err(|e| {
            warn!(error = %e, %method, %path, "request failed before a response arrived");
            ClientError::Transport(e)
        })?;

        let status = response.status().as_u16();
        let text = response.text().await.map_err(ClientError::Transport)?;

        if !(200..300).contains(&status) {
            let message = error_message(status, &text);
            debug!(status, %method, %path, %message, "backend rejected request");
            return Err(ClientError::Api { status, message });
        }
        Ok(text)
    }

    async fn send<B, T>(&self, method: Method, path: &str, query: &[(&str, &str)], body: Option<&B>) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.build_request(method, path, query, body)?;
        let text = self.execute(request).await?;
        decode(&text)
    }

    /// `GET path` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`]; additionally `Decode` if the body is not a `T`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ClientError> {
        self.send::<(), T>(Method::GET, path, &[], None).await
    }

    /// `GET path?query` and decode the JSON body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn get_with_query<T: DeserializeOwned>(&self, path: &str, query: &[(&str, &str)]) -> Result<T, ClientError> {
        self.send::<(), T>(Method::GET, path, query, None).await
    }

    /// `POST path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::POST, path, &[], Some(body)).await
    }

    /// `PUT path` with a JSON body and decode the JSON response.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::get`].
    pub async fn put<B, T>(&self, path: &str, body: &B) -> Result<T, ClientError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.send(Method::PUT, path, &[], Some(body)).await
    }

    /// `POST path` with a JSON body, ignoring whatever the backend returns on success.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn post_discard<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<(), ClientError> {
        let request = self.build_request(Method::POST, path, &[], Some(body))?;
        self.execute(request).await.map(drop)
    }

    /// `DELETE path`, ignoring the response body.
    ///
    /// # Errors
    ///
    /// See [`ApiClient::execute`].
    pub async fn delete(&self, path: &str) -> Result<(), ClientError> {
        let request = self.build_request::<()>(Method::DELETE, path, &[], None)?;
        self.execute(request).await.map(drop)
    }
}

// =============================================================================
// PARSING
// =============================================================================

fn decode<T: DeserializeOwned>(text: &str) -> Result<T, ClientError> {
    serde_json::from_str(text).map_err(|e| ClientError::Decode(e.to_string()))
}

/// Best human-readable message for a rejected request: backend `message`, then raw body, then status.
fn error_message(status: u16, body: &str) -> String {
    let from_json = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty());
    if let Some(message) = from_json {
        return message;
    }
    let trimmed = body.trim();
    if !trimmed.is_empty() && !trimmed.starts_with('{') {
        return trimmed.to_string();
    }
    format!("HTTP {status}")
}
