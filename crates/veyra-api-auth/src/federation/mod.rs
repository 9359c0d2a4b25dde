//! Federated identity verification.
//!
//! Given an opaque provider-issued token, produce a verified identity
//! claim. Three interchangeable strategies exist — cryptographic ID-token
//! verification, introspection-endpoint verification, and bearer userinfo
//! verification — all enforcing one contract: reject on provider failure
//! or timeout, on a missing email, and on `email_verified == false`.
//!
//! The orchestrator never branches on the strategy; it is selected once at
//! startup from configuration.

mod id_token;
mod introspection;
mod userinfo;

pub use id_token::IdTokenVerifier;
pub use introspection::IntrospectionVerifier;
pub use userinfo::UserinfoVerifier;

use crate::config::{FederationConfig, FederationEndpoints};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use thiserror::Error;

/// Identity claim extracted from a verified provider token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedIdentity {
    /// Email asserted by the provider.
    pub email: String,
    /// Display name, when the provider supplies one.
    pub display_name: Option<String>,
    /// Provider subject id; becomes the account's `federated_id`.
    pub subject: String,
    /// Whether the provider marked the email as verified. Absence of the
    /// claim is treated as verified; an explicit `false` is rejected.
    pub email_verified: bool,
}

/// Failures of federated verification. Every variant classifies as a bad
/// federated token at the boundary.
#[derive(Debug, Error)]
pub enum FederationError {
    /// The token failed signature, audience, issuer or claim validation.
    #[error("Federated token rejected: {reason}")]
    Rejected { reason: String },

    /// The provider asserted no email for this subject.
    #[error("Federated token carries no email")]
    MissingEmail,

    /// The provider marked the asserted email as unverified.
    #[error("Federated email is not verified")]
    EmailUnverified,

    /// The provider call failed or timed out.
    #[error("Identity provider unreachable: {reason}")]
    Provider { reason: String },
}

/// A configured federated verification strategy.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    /// Verify a provider token and extract the identity claim.
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, FederationError>;

    /// Which strategy this verifier implements.
    fn strategy(&self) -> VerifierStrategy;
}

/// Verification strategy selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifierStrategy {
    /// Validate the token signature against the provider's published keys.
    IdToken,
    /// Ask the provider's token-introspection endpoint.
    Introspection,
    /// Present the token as a bearer credential to the userinfo endpoint.
    Userinfo,
}

impl std::fmt::Display for VerifierStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerifierStrategy::IdToken => f.write_str("id_token"),
            VerifierStrategy::Introspection => f.write_str("introspection"),
            VerifierStrategy::Userinfo => f.write_str("userinfo"),
        }
    }
}

/// Build the verifier selected by configuration.
///
/// Endpoint presence per strategy is validated at config load, so this
/// construction is infallible.
#[must_use]
pub fn build_verifier(config: &FederationConfig) -> Arc<dyn IdentityVerifier> {
    match &config.endpoints {
        FederationEndpoints::IdToken { jwks_uri, issuer } => Arc::new(IdTokenVerifier::new(
            jwks_uri.clone(),
            issuer.clone(),
            config.client_id.clone(),
            config.timeout,
        )),
        FederationEndpoints::Introspection { url } => Arc::new(IntrospectionVerifier::new(
            url.clone(),
            config.client_id.clone(),
            config.timeout,
        )),
        FederationEndpoints::Userinfo { url } => {
            Arc::new(UserinfoVerifier::new(url.clone(), config.timeout))
        }
    }
}

/// An `aud` claim that providers return either as a string or an array.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum StringOrArray {
    Single(String),
    Multiple(Vec<String>),
}

impl StringOrArray {
    /// Whether the audience contains a specific value.
    #[must_use]
    pub fn contains(&self, value: &str) -> bool {
        match self {
            StringOrArray::Single(s) => s == value,
            StringOrArray::Multiple(v) => v.iter().any(|s| s == value),
        }
    }
}

/// Assemble the identity claim, enforcing the parts of the contract shared
/// by every strategy: an email must be present, and an explicit
/// `email_verified == false` is rejected.
pub(crate) fn identity_from_claims(
    subject: String,
    email: Option<String>,
    email_verified: Option<bool>,
    display_name: Option<String>,
) -> Result<VerifiedIdentity, FederationError> {
    let email = match email {
        Some(e) if !e.is_empty() => e,
        _ => return Err(FederationError::MissingEmail),
    };
    if email_verified == Some(false) {
        return Err(FederationError::EmailUnverified);
    }
    Ok(VerifiedIdentity {
        email,
        display_name,
        subject,
        email_verified: email_verified.unwrap_or(true),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn string_or_array_matches_both_shapes() {
        let single: StringOrArray = serde_json::from_str(r#""client-1""#).unwrap();
        assert!(single.contains("client-1"));
        assert!(!single.contains("client-2"));

        let multi: StringOrArray = serde_json::from_str(r#"["client-1","client-2"]"#).unwrap();
        assert!(multi.contains("client-2"));
        assert!(!multi.contains("client-3"));
    }

    #[test]
    fn identity_requires_email() {
        let err = identity_from_claims("sub-1".into(), None, None, None).unwrap_err();
        assert!(matches!(err, FederationError::MissingEmail));

        let err =
            identity_from_claims("sub-1".into(), Some(String::new()), None, None).unwrap_err();
        assert!(matches!(err, FederationError::MissingEmail));
    }

    #[test]
    fn identity_rejects_explicitly_unverified_email() {
        let err = identity_from_claims(
            "sub-1".into(),
            Some("a@example.com".into()),
            Some(false),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, FederationError::EmailUnverified));
    }

    #[test]
    fn identity_treats_absent_verification_claim_as_verified() {
        let identity =
            identity_from_claims("sub-1".into(), Some("a@example.com".into()), None, None)
                .unwrap();
        assert!(identity.email_verified);
        assert_eq!(identity.subject, "sub-1");
    }
}
