//! User directory: the durable store of accounts.
//!
//! The core only requires a key-unique store reachable by id, by email and
//! by federated subject id. Email uniqueness is enforced by the store
//! itself, never only by a pre-check, because concurrent registrations can
//! race; implementations surface that condition as
//! [`DirectoryError::DuplicateEmail`] so callers can recover.

mod memory;
mod postgres;

pub use memory::InMemoryDirectory;
pub use postgres::PgDirectory;

use crate::models::{Account, NewAccount};
use async_trait::async_trait;
use thiserror::Error;
use veyra_core::AccountId;

/// Failures surfaced by a directory implementation.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// A concurrent writer already took this email.
    #[error("Email already registered: {email}")]
    DuplicateEmail { email: String },

    /// The federated subject id is already linked to another account.
    #[error("Federated identity already linked to another account")]
    DuplicateFederatedId,

    /// The referenced account does not exist.
    #[error("Account not found")]
    NotFound,

    /// Underlying store failure.
    #[error("Directory backend error: {0}")]
    Backend(#[from] sqlx::Error),
}

/// Durable store of accounts.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Look up an account by its unique email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError>;

    /// Look up an account by id.
    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DirectoryError>;

    /// Look up an account by federated subject id.
    async fn find_by_federated_id(
        &self,
        federated_id: &str,
    ) -> Result<Option<Account>, DirectoryError>;

    /// Insert a new account, assigning its id.
    ///
    /// Fails with [`DirectoryError::DuplicateEmail`] when the store-level
    /// uniqueness constraint rejects the email.
    async fn insert(&self, account: NewAccount) -> Result<Account, DirectoryError>;

    /// One-time federation link: set `federated_id` if it is still unset.
    ///
    /// A link that is already present is left untouched; the id is never
    /// reassigned. Returns the account as stored after the call.
    async fn link_federated_id(
        &self,
        id: AccountId,
        federated_id: &str,
    ) -> Result<Account, DirectoryError>;
}
