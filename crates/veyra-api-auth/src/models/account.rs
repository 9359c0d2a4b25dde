//! Account and role model.

use serde::{Deserialize, Serialize};
use veyra_core::AccountId;

/// Authorization tier referenced by every account.
///
/// Closed enumeration; deployments cannot add tiers. Parsing accepts the
/// legacy `ROLE_` prefix and any casing, so `admin`, `ADMIN` and
/// `ROLE_ADMIN` all resolve to the same tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Standard user.
    User,
    /// Administrator.
    Admin,
}

impl Role {
    /// Resolve a configured role name, applying the normalization policy:
    /// case-insensitive, optional `ROLE_` prefix.
    ///
    /// Returns `None` for names outside the closed set — callers treat that
    /// as a deployment misconfiguration, not a user error.
    #[must_use]
    pub fn resolve(name: &str) -> Option<Self> {
        let normalized = name.trim().to_ascii_lowercase();
        let normalized = normalized.strip_prefix("role_").unwrap_or(&normalized);
        match normalized {
            "user" => Some(Role::User),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    /// Canonical authority name carried in token claims.
    #[must_use]
    pub fn authority(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.authority())
    }
}

/// One registered identity, local and/or federated.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// Surrogate identifier, assigned at creation.
    pub id: AccountId,
    /// Display name.
    pub username: String,
    /// Unique natural login key.
    pub email: String,
    /// Argon2id digest of the local password. Federation-only accounts hold
    /// a digest of a random secret nobody knows.
    pub password_hash: String,
    /// External provider subject id; set at most once, never cleared.
    pub federated_id: Option<String>,
    /// Authorization tier.
    pub role: Role,
}

/// Account fields known before the store assigns an id.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub federated_id: Option<String>,
    pub role: Role,
}
