//! Cryptographic ID-token verification against the provider's published keys.
//!
//! Fetches the provider JWKS, verifies the token signature, and validates
//! issuer, audience and expiry locally. No provider round-trip happens on
//! the hot path once the key set is cached.

use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use moka::sync::Cache;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use super::{identity_from_claims, FederationError, IdentityVerifier, VerifiedIdentity, VerifierStrategy};
use async_trait::async_trait;

/// Maximum JWKS response size (512 KB) to prevent OOM from malicious responses.
const MAX_JWKS_SIZE: usize = 512 * 1024;

/// JWKS cache TTL: 10 minutes.
const JWKS_CACHE_TTL_SECS: u64 = 600;

/// One entry per JWKS endpoint; a single provider is configured, but key
/// rotation briefly leaves two generations alive.
const JWKS_CACHE_MAX_CAPACITY: u64 = 4;

/// Clock skew leeway for token expiry validation (60 seconds).
const LEEWAY_SECS: u64 = 60;

/// OIDC ID token claims this verifier consumes.
#[derive(Debug, Deserialize)]
struct OidcIdTokenClaims {
    sub: String,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    email_verified: Option<bool>,
    #[serde(default)]
    name: Option<String>,
}

/// JWKS response structure (standard RFC 7517).
#[derive(Debug, Clone, Deserialize)]
struct JwkSet {
    keys: Vec<Jwk>,
}

/// Individual JWK from a JWKS endpoint.
#[derive(Debug, Clone, Deserialize)]
struct Jwk {
    kid: Option<String>,
    kty: String,
    alg: Option<String>,
    /// RSA modulus (base64url encoded).
    n: Option<String>,
    /// RSA exponent (base64url encoded).
    e: Option<String>,
}

/// Verifier that validates provider ID tokens against the provider JWKS.
///
/// Constructed once at startup; the JWKS cache lives with the instance.
pub struct IdTokenVerifier {
    http_client: Client,
    jwks_uri: String,
    issuer: String,
    client_id: String,
    jwks_cache: Cache<String, JwkSet>,
}

impl IdTokenVerifier {
    /// Create a verifier for the given JWKS endpoint and expected issuer.
    #[must_use]
    pub fn new(jwks_uri: String, issuer: String, client_id: String, timeout: Duration) -> Self {
        Self {
            http_client: Client::builder()
                .timeout(timeout)
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap_or_else(|_| Client::new()),
            jwks_uri,
            issuer,
            client_id,
            jwks_cache: Cache::builder()
                .max_capacity(JWKS_CACHE_MAX_CAPACITY)
                .time_to_live(Duration::from_secs(JWKS_CACHE_TTL_SECS))
                .build(),
        }
    }

    /// Get JWKS from cache or fetch from the provider.
    async fn get_jwks(&self) -> Result<JwkSet, FederationError> {
        if let Some(cached) = self.jwks_cache.get(&self.jwks_uri) {
            return Ok(cached);
        }
        let fetched = self.fetch_jwks().await?;
        self.jwks_cache.insert(self.jwks_uri.clone(), fetched.clone());
        Ok(fetched)
    }

    /// Fetch JWKS from the provider with a size limit.
    async fn fetch_jwks(&self) -> Result<JwkSet, FederationError> {
        let response = self
            .http_client
            .get(&self.jwks_uri)
            .send()
            .await
            .map_err(|e| FederationError::Provider {
                reason: format!("JWKS request failed: {e}"),
            })?;

        if !response.status().is_success() {
            return Err(FederationError::Provider {
                reason: format!("JWKS endpoint returned HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| FederationError::Provider {
            reason: format!("Failed to read JWKS response: {e}"),
        })?;

        if bytes.len() > MAX_JWKS_SIZE {
            return Err(FederationError::Provider {
                reason: format!(
                    "JWKS response too large: {} bytes (max {MAX_JWKS_SIZE})",
                    bytes.len()
                ),
            });
        }

        serde_json::from_slice(&bytes).map_err(|e| FederationError::Provider {
            reason: format!("Failed to parse JWKS: {e}"),
        })
    }

    /// Find the signing key for `kid`, force-refreshing once on a miss to
    /// pick up key rotation.
    async fn signing_key(&self, kid: &str) -> Result<Jwk, FederationError> {
        let jwks = self.get_jwks().await?;
        if let Some(key) = jwks.keys.iter().find(|k| k.kid.as_deref() == Some(kid)) {
            return Ok(key.clone());
        }

        info!(kid = %kid, "JWKS kid not found in cache, refreshing for key rotation");
        self.jwks_cache.invalidate(&self.jwks_uri);

        let refreshed = self.fetch_jwks().await?;
        let key = refreshed
            .keys
            .iter()
            .find(|k| k.kid.as_deref() == Some(kid))
            .ok_or_else(|| FederationError::Rejected {
                reason: format!("No public key found for kid '{kid}' (even after JWKS refresh)"),
            })?
            .clone();
        self.jwks_cache.insert(self.jwks_uri.clone(), refreshed);
        Ok(key)
    }
}

/// Build a decoding key and algorithm from a JWK.
///
/// Algorithm is taken from the JWK's `alg` field, never from the JWT header,
/// to prevent algorithm confusion attacks.
fn build_decoding_key(jwk: &Jwk) -> Result<(DecodingKey, Algorithm), FederationError> {
    match jwk.kty.as_str() {
        "RSA" => {
            let n = jwk.n.as_ref().ok_or_else(|| FederationError::Rejected {
                reason: "RSA JWK missing 'n' field".to_string(),
            })?;
            let e = jwk.e.as_ref().ok_or_else(|| FederationError::Rejected {
                reason: "RSA JWK missing 'e' field".to_string(),
            })?;
            let key =
                DecodingKey::from_rsa_components(n, e).map_err(|e| FederationError::Rejected {
                    reason: format!("Failed to build RSA decoding key: {e}"),
                })?;
            let alg = match jwk.alg.as_deref() {
                Some("RS384") => Algorithm::RS384,
                Some("RS512") => Algorithm::RS512,
                _ => Algorithm::RS256,
            };
            Ok((key, alg))
        }
        other => Err(FederationError::Rejected {
            reason: format!("Unsupported JWK key type: {other}"),
        }),
    }
}

#[async_trait]
impl IdentityVerifier for IdTokenVerifier {
    async fn verify(&self, token: &str) -> Result<VerifiedIdentity, FederationError> {
        let header = decode_header(token).map_err(|e| FederationError::Rejected {
            reason: format!("Failed to decode ID token header: {e}"),
        })?;

        let kid = header.kid.ok_or_else(|| FederationError::Rejected {
            reason: "ID token missing kid in header".to_string(),
        })?;

        let jwk = self.signing_key(&kid).await?;
        let (decoding_key, algorithm) = build_decoding_key(&jwk)?;

        let mut validation = Validation::new(algorithm);
        validation.set_audience(&[&self.client_id]);
        validation.set_issuer(&[&self.issuer]);
        validation.leeway = LEEWAY_SECS;

        let token_data = decode::<OidcIdTokenClaims>(token, &decoding_key, &validation)
            .map_err(|e| FederationError::Rejected {
                reason: format!("Signature or claims validation failed: {e}"),
            })?;

        let claims = token_data.claims;
        identity_from_claims(claims.sub, claims.email, claims.email_verified, claims.name)
    }

    fn strategy(&self) -> VerifierStrategy {
        VerifierStrategy::IdToken
    }
}
