//! Authentication core for the veyra user directory.
//!
//! Implements credential-based registration and login, federated-login
//! reconciliation, session token issuance, authorization context derivation,
//! and the error classification layer the HTTP boundary renders.
//!
//! The HTTP layer itself is a thin shell: handlers validate the request
//! shape, call the [`services::AuthService`] orchestrator, and let every
//! failure surface through [`error::ApiAuthError`].

pub mod config;
pub mod error;
pub mod federation;
pub mod handlers;
pub mod models;
pub mod router;
pub mod services;
pub mod store;

#[cfg(test)]
mod test_keys;

pub use config::AuthConfig;
pub use error::{ApiAuthError, ApiAuthResult};
pub use router::{auth_router, AppState};
