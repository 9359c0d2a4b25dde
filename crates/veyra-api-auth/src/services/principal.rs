//! The authorization context: who a request acts as and what they hold.

use crate::models::Account;
use veyra_auth::SessionClaims;
use veyra_core::AccountId;

/// Identity attached to a request.
///
/// Built from an account at token issuance and from validated claims on
/// the way back in; both constructions are pure projections with no I/O.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// The account email (the token subject).
    pub subject: String,
    /// Surrogate account id, when known.
    pub account_id: Option<AccountId>,
    /// Granted authority names.
    pub authorities: Vec<String>,
}

impl Principal {
    /// Derive the authorization context for an account.
    #[must_use]
    pub fn from_account(account: &Account) -> Self {
        Self {
            subject: account.email.clone(),
            account_id: Some(account.id),
            authorities: vec![account.role.authority().to_string()],
        }
    }

    /// Whether the principal holds a specific authority.
    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

impl From<SessionClaims> for Principal {
    fn from(claims: SessionClaims) -> Self {
        Self {
            subject: claims.sub,
            account_id: claims.uid,
            authorities: claims.authorities,
        }
    }
}
