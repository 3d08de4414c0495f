//! Client-side application state.

pub mod auth;

pub use auth::{AuthPhase, AuthState, SessionManager};
