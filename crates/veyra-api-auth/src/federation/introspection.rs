//! Token-introspection verification (RFC 7662 shape).
//!
//! The opaque provider token is posted to the provider's introspection
//! endpoint; the provider answers whether it is active and for whom.

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use super::{
    identity_from_claims, FederationError, IdentityVerifier, StringOrArray, VerifiedIdentity,
    VerifierStrategy,
};
use async_trait::async_trait;

/// Introspection response fields this verifier consumes.
#[derive(Debug, Deserialize)]
struct IntrospectionResponse {
    active: bool,
    #[serde(default)]
    sub: Option<String>,
    #[serde(default)]
    aud: Option<StringOrArray>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
}

/// Verifier that delegates token validation to the provider's
/// introspection endpoint.
pub struct IntrospectionVerifier {
    http_client: Client,
    url: String,
    client_id: String,
}

impl IntrospectionVerifier {
    /// Create a verifier for the given introspection endpoint.
    #[must_use]
    pub fn new(url: String, client_id: String, timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap_or_else(|_| Client::new()),
            url,
            client_id,
        }
    }
}

#[async_trait]
impl IdentityVerifier for IntrospectionVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, FederationError> {
        let response = self
            .http_client
            .post(&self.url)
            .form(&[("token", token)])
            .send()
            .await
            .map_err(|e| FederationError::Provider {
                reason: format!("Introspection request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(FederationError::Provider {
                reason: format!("Introspection endpoint returned HTTP {}", response.status()),
            });
        }

        let body: IntrospectionResponse =
            response.json().await.map_err(|e| FederationError::Provider {
                reason: format!("Failed to parse introspection response: {e}"),
            })?;

        if !body.active {
            return Err(FederationError::Rejected {
                reason: "Token is not active".to_string(),
            });
        }

        // An introspected token issued for someone else is not ours to accept.
        match &body.aud {
            Some(aud) if aud.contains(&self.client_id) => {}
            _ => {
                return Err(FederationError::Rejected {
                    reason: "Token audience does not include this client".to_string(),
                })
            }
        }

        let subject = body.sub.ok_or_else(|| FederationError::Rejected {
            reason: "Introspection response carries no subject".to_string(),
        })?;

        identity_from_claims(subject, body.email, body.email_verified, body.name)
    }

    fn strategy(&self) -> VerifierStrategy {
        VerifierStrategy::Introspection
    }
}
