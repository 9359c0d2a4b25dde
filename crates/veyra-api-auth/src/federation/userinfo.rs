//! Bearer userinfo verification.
//!
//! The provider token is presented as a bearer credential to the userinfo
//! endpoint; a 200 response is taken as proof the token is live and the
//! claims in the body describe its owner. Weaker than the other strategies
//! (no audience check is possible), so the endpoint itself is the trust
//! boundary.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{
    identity_from_claims, FederationError, IdentityVerifier, VerifiedIdentity, VerifierStrategy,
};
use async_trait::async_trait;

/// Userinfo claims this verifier consumes (standard OIDC names).
#[derive(Debug, Deserialize)]
struct UserinfoResponse {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
}

/// Verifier that presents the token to the provider's userinfo endpoint.
pub struct UserinfoVerifier {
    http_client: Client,
    url: String,
}

impl UserinfoVerifier {
    /// Create a verifier for the given userinfo endpoint.
    #[must_use]
    pub fn new(url: String, timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap_or_else(|_| Client::new()),
            url,
        }
    }
}

#[async_trait]
impl IdentityVerifier for UserinfoVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, FederationError> {
        let response = self
            .http_client
            .get(&self.url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| FederationError::Provider {
                reason: format!("Userinfo request failed: {e}"),
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            // The provider examined the token and turned it down.
            return Err(FederationError::Rejected {
                reason: format!("Userinfo endpoint refused the token (HTTP {status})"),
            });
        }
        if !status.is_success() {
            return Err(FederationError::Provider {
                reason: format!("Userinfo endpoint returned HTTP {status}"),
            });
        }

        let body: UserinfoResponse =
            response.json().await.map_err(|e| FederationError::Provider {
                reason: format!("Failed to parse userinfo response: {e}"),
            })?;

        identity_from_claims(body.sub, body.email, body.email_verified, body.name)
    }

    fn strategy(&self) -> VerifierStrategy {
        VerifierStrategy::Userinfo
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn userinfo_deserializes_with_minimal_claims() {
        let body: UserinfoResponse = serde_json::from_str(r#"{"sub":"sub-1"}"#).unwrap();
        assert_eq!(body.sub, "sub-1");
        assert!(body.email.is_none());
    }

    #[test]
    fn userinfo_deserializes_full_claims() {
        let body: UserinfoResponse = serde_json::from_str(
            r#"{"sub":"sub-1","email":"a@example.com","email_verified":true,"name":"Ada"}"#,
        )
        .unwrap();
        assert_eq!(body.email.as_deref(), Some("a@example.com"));
        assert_eq!(body.name.as_deref(), Some("Ada"));
    }
}
