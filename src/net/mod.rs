//! Networking: wire types, the shared HTTP pipeline, and the contact service.

pub mod api;
pub mod contacts;
pub mod types;

pub use api::{ApiClient, BearerTokenInterceptor, RequestInterceptor};
pub use contacts::ContactService;
