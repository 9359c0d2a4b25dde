//! Session token issuance and validation.

use crate::config::TokenConfig;
use crate::error::ApiAuthResult;
use crate::models::Account;
use crate::services::Principal;
use veyra_auth::{decode_token_with_config, encode_token, SessionClaims, ValidationConfig};

/// Issues and validates signed session tokens for authenticated accounts.
#[derive(Clone)]
pub struct TokenService {
    private_key_pem: Vec<u8>,
    public_key_pem: Vec<u8>,
    issuer: String,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a token service from configuration.
    #[must_use]
    pub fn new(config: &TokenConfig) -> Self {
        Self {
            private_key_pem: config.private_key_pem.as_bytes().to_vec(),
            public_key_pem: config.public_key_pem.as_bytes().to_vec(),
            issuer: config.issuer.clone(),
            ttl_secs: config.ttl_secs,
        }
    }

    /// Issue a session token for an authenticated account.
    ///
    /// The subject is the account email; the authorities claim carries the
    /// account's role so downstream checks need no directory lookup.
    pub fn issue(&self, account: &Account) -> ApiAuthResult<String> {
        let principal = Principal::from_account(account);
        let claims = SessionClaims::builder()
            .subject(principal.subject)
            .issuer(&self.issuer)
            .account_id(account.id)
            .authorities(principal.authorities)
            .expires_in_secs(self.ttl_secs)
            .build();

        Ok(encode_token(&claims, &self.private_key_pem)?)
    }

    /// Validate a session token and return its claims.
    ///
    /// Distinguishes expiry, bad signature and malformed tokens; see
    /// [`crate::error::ApiAuthError`] for the classification.
    pub fn validate(&self, token: &str) -> ApiAuthResult<SessionClaims> {
        let config = ValidationConfig::default().issuer(&self.issuer);
        Ok(decode_token_with_config(
            token,
            &self.public_key_pem,
            &config,
        )?)
    }
}
