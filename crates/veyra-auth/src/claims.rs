//! Session token claims.
//!
//! `SessionClaims` carries the RFC 7519 standard claims plus the veyra
//! custom claims: the account id and the granted authorities.

use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use veyra_core::AccountId;

/// Claims embedded in a veyra session token.
///
/// The subject is the account email; `uid` carries the surrogate account id
/// so downstream checks never need a directory lookup.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionClaims {
    /// Subject: the account email.
    pub sub: String,

    /// Issuer.
    pub iss: String,

    /// Expiration time as Unix timestamp.
    pub exp: i64,

    /// Issued-at as Unix timestamp.
    pub iat: i64,

    /// Unique token identifier.
    pub jti: String,

    /// Account id of the subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uid: Option<AccountId>,

    /// Granted authorities (role names).
    #[serde(default)]
    pub authorities: Vec<String>,
}

impl SessionClaims {
    /// Start building a claim set.
    #[must_use]
    pub fn builder() -> SessionClaimsBuilder {
        SessionClaimsBuilder::default()
    }

    /// Whether the token is already expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        Utc::now().timestamp() > self.exp
    }

    /// Whether the claims grant a specific authority.
    #[must_use]
    pub fn has_authority(&self, authority: &str) -> bool {
        self.authorities.iter().any(|a| a == authority)
    }
}

/// Builder for [`SessionClaims`].
#[derive(Debug, Default)]
pub struct SessionClaimsBuilder {
    sub: Option<String>,
    iss: Option<String>,
    exp: Option<i64>,
    uid: Option<AccountId>,
    authorities: Vec<String>,
}

impl SessionClaimsBuilder {
    /// Set the subject (account email).
    #[must_use]
    pub fn subject(mut self, sub: impl Into<String>) -> Self {
        self.sub = Some(sub.into());
        self
    }

    /// Set the issuer.
    #[must_use]
    pub fn issuer(mut self, iss: impl Into<String>) -> Self {
        self.iss = Some(iss.into());
        self
    }

    /// Set the account id claim.
    #[must_use]
    pub fn account_id(mut self, id: AccountId) -> Self {
        self.uid = Some(id);
        self
    }

    /// Set the granted authorities.
    #[must_use]
    pub fn authorities(mut self, authorities: Vec<impl Into<String>>) -> Self {
        self.authorities = authorities.into_iter().map(Into::into).collect();
        self
    }

    /// Set an absolute expiration timestamp.
    #[must_use]
    pub fn expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Expire the token `secs` seconds from now.
    #[must_use]
    pub fn expires_in_secs(mut self, secs: i64) -> Self {
        self.exp = Some((Utc::now() + Duration::seconds(secs)).timestamp());
        self
    }

    /// Build the claim set. Missing fields fall back to empty strings and
    /// a one-hour expiry; a fresh `jti` is always generated.
    #[must_use]
    pub fn build(self) -> SessionClaims {
        let now = Utc::now();
        SessionClaims {
            sub: self.sub.unwrap_or_default(),
            iss: self.iss.unwrap_or_default(),
            exp: self
                .exp
                .unwrap_or_else(|| (now + Duration::hours(1)).timestamp()),
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            uid: self.uid,
            authorities: self.authorities,
        }
    }
}
