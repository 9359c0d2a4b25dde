//! Shared fixtures for the integration suites.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use veyra_api_auth::config::{
    AuthConfig, FederationConfig, FederationEndpoints, TokenConfig,
};
use veyra_api_auth::federation::IdentityVerifier;
use veyra_api_auth::services::{AuthService, TokenService};
use veyra_api_auth::store::InMemoryDirectory;
use veyra_auth::PasswordHasher;

/// RSA key pair used for token signing in tests, shared with the unit
/// suites via `testdata/`. Test-only material.
pub const TEST_PRIVATE_KEY_PEM: &str = include_str!("../../testdata/test_rsa_private.pem");

pub const TEST_PUBLIC_KEY_PEM: &str = include_str!("../../testdata/test_rsa_public.pem");

/// Base64url modulus of the test public key, for serving as a JWK.
pub const TEST_JWK_MODULUS: &str = "ntYt8bQldPkLHwnfHfhTvrzfEzhHYfGbqxolzyS2NC-5XgtTUB7mSHnYjlLMRx88j-Ow1-r3UMK3KoIIPE4AXojvnw-DfWxGhMOIXrXO6UFMvNiY3MQbp-IhRyRZ2ozPvhB_mYc3odJRq1UOTbefqTDUZf_-DuX_YUeixg8Eywvmp_9S8PHC6eUntcDql20WVBKsjdRGKPaa_kHD2XCjx7m9_Ojjk-W4QXvbm6Fohat5sHpFv9UJMsmjf2Xy5E4ZHbRRDNTW0Aihf545okNRvR4h6jAbt9t9_WWmNxTMuhveXJzsgr92zyrgHGag0Cp_65__aek_Sa9rUcoMN2iw_w";

pub const TEST_JWK_EXPONENT: &str = "AQAB";

/// Client id every audience-checking fixture expects.
pub const TEST_CLIENT_ID: &str = "veyra-test-client";

pub fn test_token_config() -> TokenConfig {
    TokenConfig {
        private_key_pem: TEST_PRIVATE_KEY_PEM.to_string(),
        public_key_pem: TEST_PUBLIC_KEY_PEM.to_string(),
        issuer: "veyra-test".to_string(),
        ttl_secs: 3600,
    }
}

pub fn test_config() -> AuthConfig {
    AuthConfig {
        database_url: "postgres://unused-in-tests".to_string(),
        token: test_token_config(),
        federation: FederationConfig {
            client_id: TEST_CLIENT_ID.to_string(),
            timeout: Duration::from_secs(5),
            endpoints: FederationEndpoints::Userinfo {
                url: "http://127.0.0.1:0/userinfo".to_string(),
            },
        },
        default_role: "user".to_string(),
        federated_default_role: "user".to_string(),
    }
}

/// Wire an auth service over an in-memory directory and the given verifier.
pub fn auth_service_with(verifier: Arc<dyn IdentityVerifier>) -> AuthService {
    let config = test_config();
    AuthService::new(
        Arc::new(InMemoryDirectory::new()),
        verifier,
        // Small hash parameters keep the suite fast.
        PasswordHasher::with_params(4096, 1, 1).expect("valid test parameters"),
        TokenService::new(&config.token),
        &config,
    )
}
