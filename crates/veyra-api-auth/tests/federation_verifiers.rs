//! Federated verifier integration tests against a mock identity provider.

mod common;

use std::time::Duration;

use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use common::{TEST_CLIENT_ID, TEST_JWK_EXPONENT, TEST_JWK_MODULUS, TEST_PRIVATE_KEY_PEM};
use veyra_api_auth::federation::{
    FederationError, IdTokenVerifier, IdentityVerifier, IntrospectionVerifier, UserinfoVerifier,
};

const TEST_KID: &str = "test-key-1";
const TEST_ISSUER: &str = "https://idp.example.test";

fn jwks_body() -> serde_json::Value {
    json!({
        "keys": [
            {
                "kty": "RSA",
                "kid": TEST_KID,
                "use": "sig",
                "alg": "RS256",
                "n": TEST_JWK_MODULUS,
                "e": TEST_JWK_EXPONENT
            }
        ]
    })
}

fn sign_id_token(claims: &serde_json::Value) -> String {
    let mut header = Header::new(Algorithm::RS256);
    header.kid = Some(TEST_KID.to_string());
    let key = EncodingKey::from_rsa_pem(TEST_PRIVATE_KEY_PEM.as_bytes()).unwrap();
    encode(&header, claims, &key).unwrap()
}

fn standard_claims() -> serde_json::Value {
    let now = chrono::Utc::now().timestamp();
    json!({
        "iss": TEST_ISSUER,
        "aud": TEST_CLIENT_ID,
        "sub": "provider-sub-1",
        "exp": now + 3600,
        "iat": now,
        "email": "ada@example.com",
        "email_verified": true,
        "name": "Ada Lovelace"
    })
}

async fn mount_jwks(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
        .mount(server)
        .await;
}

fn id_token_verifier(server: &MockServer) -> IdTokenVerifier {
    IdTokenVerifier::new(
        format!("{}/jwks", server.uri()),
        TEST_ISSUER.to_string(),
        TEST_CLIENT_ID.to_string(),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn id_token_happy_path() {
    let server = MockServer::start().await;
    mount_jwks(&server).await;

    let token = sign_id_token(&standard_claims());
    let identity = id_token_verifier(&server).verify(&token).await.unwrap();

    assert_eq!(identity.email, "ada@example.com");
    assert_eq!(identity.subject, "provider-sub-1");
    assert_eq!(identity.display_name.as_deref(), Some("Ada Lovelace"));
    assert!(identity.email_verified);
}

#[tokio::test]
async fn id_token_jwks_is_fetched_once_for_repeat_verifications() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(jwks_body()))
        .expect(1)
        .mount(&server)
        .await;

    let verifier = id_token_verifier(&server);
    let token = sign_id_token(&standard_claims());

    verifier.verify(&token).await.unwrap();
    verifier.verify(&token).await.unwrap();
}

#[tokio::test]
async fn id_token_wrong_audience_is_rejected() {
    let server = MockServer::start().await;
    mount_jwks(&server).await;

    let mut claims = standard_claims();
    claims["aud"] = json!("someone-elses-client");
    let token = sign_id_token(&claims);

    let err = id_token_verifier(&server).verify(&token).await.unwrap_err();
    assert!(matches!(err, FederationError::Rejected { .. }));
}

#[tokio::test]
async fn id_token_wrong_issuer_is_rejected() {
    let server = MockServer::start().await;
    mount_jwks(&server).await;

    let mut claims = standard_claims();
    claims["iss"] = json!("https://rogue.example.test");
    let token = sign_id_token(&claims);

    let err = id_token_verifier(&server).verify(&token).await.unwrap_err();
    assert!(matches!(err, FederationError::Rejected { .. }));
}

#[tokio::test]
async fn id_token_expired_is_rejected() {
    let server = MockServer::start().await;
    mount_jwks(&server).await;

    let now = chrono::Utc::now().timestamp();
    let mut claims = standard_claims();
    claims["exp"] = json!(now - 3600);
    claims["iat"] = json!(now - 7200);
    let token = sign_id_token(&claims);

    let err = id_token_verifier(&server).verify(&token).await.unwrap_err();
    assert!(matches!(err, FederationError::Rejected { .. }));
}

#[tokio::test]
async fn id_token_unverified_email_is_rejected() {
    let server = MockServer::start().await;
    mount_jwks(&server).await;

    let mut claims = standard_claims();
    claims["email_verified"] = json!(false);
    let token = sign_id_token(&claims);

    let err = id_token_verifier(&server).verify(&token).await.unwrap_err();
    assert!(matches!(err, FederationError::EmailUnverified));
}

#[tokio::test]
async fn id_token_missing_email_is_rejected() {
    let server = MockServer::start().await;
    mount_jwks(&server).await;

    let mut claims = standard_claims();
    claims.as_object_mut().unwrap().remove("email");
    claims.as_object_mut().unwrap().remove("email_verified");
    let token = sign_id_token(&claims);

    let err = id_token_verifier(&server).verify(&token).await.unwrap_err();
    assert!(matches!(err, FederationError::MissingEmail));
}

#[tokio::test]
async fn id_token_unknown_kid_fails_even_after_refresh() {
    let server = MockServer::start().await;
    // JWKS with a different kid than the token's.
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [
                {
                    "kty": "RSA",
                    "kid": "rotated-away",
                    "alg": "RS256",
                    "n": TEST_JWK_MODULUS,
                    "e": TEST_JWK_EXPONENT
                }
            ]
        })))
        // Initial fetch plus the forced rotation refresh.
        .expect(2)
        .mount(&server)
        .await;

    let token = sign_id_token(&standard_claims());
    let err = id_token_verifier(&server).verify(&token).await.unwrap_err();
    assert!(matches!(err, FederationError::Rejected { .. }));
}

#[tokio::test]
async fn id_token_jwks_server_error_is_a_provider_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jwks"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let token = sign_id_token(&standard_claims());
    let err = id_token_verifier(&server).verify(&token).await.unwrap_err();
    assert!(matches!(err, FederationError::Provider { .. }));
}

fn introspection_verifier(server: &MockServer) -> IntrospectionVerifier {
    IntrospectionVerifier::new(
        format!("{}/introspect", server.uri()),
        TEST_CLIENT_ID.to_string(),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn introspection_happy_path() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/introspect"))
        .and(body_string_contains("token=opaque-token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "sub": "provider-sub-1",
            "aud": [TEST_CLIENT_ID, "other-client"],
            "email": "ada@example.com",
            "email_verified": true,
            "name": "Ada Lovelace"
        })))
        .mount(&server)
        .await;

    let identity = introspection_verifier(&server)
        .verify("opaque-token-1")
        .await
        .unwrap();
    assert_eq!(identity.subject, "provider-sub-1");
    assert_eq!(identity.email, "ada@example.com");
}

#[tokio::test]
async fn introspection_inactive_token_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/introspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "active": false })))
        .mount(&server)
        .await;

    let err = introspection_verifier(&server)
        .verify("revoked-token")
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::Rejected { .. }));
}

#[tokio::test]
async fn introspection_foreign_audience_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/introspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "sub": "provider-sub-1",
            "aud": "someone-elses-client",
            "email": "ada@example.com"
        })))
        .mount(&server)
        .await;

    let err = introspection_verifier(&server)
        .verify("foreign-token")
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::Rejected { .. }));
}

#[tokio::test]
async fn introspection_server_error_is_a_provider_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/introspect"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = introspection_verifier(&server)
        .verify("any-token")
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::Provider { .. }));
}

#[tokio::test]
async fn introspection_missing_email_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/introspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "sub": "provider-sub-1",
            "aud": TEST_CLIENT_ID
        })))
        .mount(&server)
        .await;

    let err = introspection_verifier(&server)
        .verify("no-email-token")
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::MissingEmail));
}

#[tokio::test]
async fn introspection_unverified_email_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/introspect"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "active": true,
            "sub": "provider-sub-1",
            "aud": TEST_CLIENT_ID,
            "email": "ada@example.com",
            "email_verified": false
        })))
        .mount(&server)
        .await;

    let err = introspection_verifier(&server)
        .verify("unverified-token")
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::EmailUnverified));
}

fn userinfo_verifier(server: &MockServer) -> UserinfoVerifier {
    UserinfoVerifier::new(
        format!("{}/userinfo", server.uri()),
        Duration::from_secs(5),
    )
}

#[tokio::test]
async fn userinfo_happy_path() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .and(header("authorization", "Bearer access-token-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "provider-sub-1",
            "email": "ada@example.com",
            "email_verified": true,
            "name": "Ada Lovelace"
        })))
        .mount(&server)
        .await;

    let identity = userinfo_verifier(&server)
        .verify("access-token-1")
        .await
        .unwrap();
    assert_eq!(identity.subject, "provider-sub-1");
    assert_eq!(identity.email, "ada@example.com");
}

#[tokio::test]
async fn userinfo_refusal_is_a_rejection() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = userinfo_verifier(&server)
        .verify("stale-token")
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::Rejected { .. }));
}

#[tokio::test]
async fn userinfo_server_error_is_a_provider_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;

    let err = userinfo_verifier(&server)
        .verify("any-token")
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::Provider { .. }));
}

#[tokio::test]
async fn userinfo_unverified_email_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/userinfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "sub": "provider-sub-1",
            "email": "ada@example.com",
            "email_verified": false
        })))
        .mount(&server)
        .await;

    let err = userinfo_verifier(&server)
        .verify("any-token")
        .await
        .unwrap_err();
    assert!(matches!(err, FederationError::EmailUnverified));
}
