//! Contact-book client: session lifecycle, authenticated HTTP pipeline, and
//! contact CRUD against the contact-management REST backend.
//!
//! ARCHITECTURE
//! ============
//! Leaf-first:
//! - `storage`: durable key-value storage and the credential store.
//! - `net`: wire types, the shared HTTP pipeline with its bearer interceptor,
//!   and the contact service.
//! - `state`: the session manager that owns the in-memory auth state.
//! - `routes`: the route guard that turns auth state into navigation.
//!
//! A UI action calls the session manager, which calls the pipeline; on success
//! it updates memory and storage, and guard decisions follow the new state.

pub mod config;
pub mod error;
pub mod net;
pub mod routes;
pub mod state;
pub mod storage;
pub mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use config::{ClientConfig, RegisterFailurePolicy};
pub use error::{ClientError, ErrorCode};
pub use net::{ApiClient, ContactService};
pub use routes::{Route, RouteDecision};
pub use state::{AuthPhase, AuthState, SessionManager};
pub use storage::{CredentialStore, FileStorage, KeyValueStorage, MemoryStorage};
