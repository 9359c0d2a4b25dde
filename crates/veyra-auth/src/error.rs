//! Error types for token and credential operations.

use thiserror::Error;

/// Failure modes of token validation and credential hashing.
///
/// Token validation deliberately distinguishes expiry, bad signature and
/// malformed input: callers map each to a different stable message.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Token has expired (`exp` claim is in the past).
    #[error("Token has expired")]
    TokenExpired,

    /// Token signature does not verify against the configured key.
    #[error("Invalid token signature")]
    InvalidSignature,

    /// Token is structurally malformed or carries invalid claims.
    #[error("Invalid token: {0}")]
    InvalidToken(String),

    /// Token uses an algorithm other than RS256.
    #[error("Unsupported algorithm: only RS256 is allowed")]
    InvalidAlgorithm,

    /// Required claim is missing from the token.
    #[error("Missing required claim: {0}")]
    MissingClaim(String),

    /// Signing or verification key is not a valid RSA PEM key.
    #[error("Invalid key: {0}")]
    InvalidKey(String),

    /// Password hashing failed.
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    /// Stored password hash is not a valid PHC string.
    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

impl AuthError {
    /// Whether this error indicates an expired token.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        matches!(self, AuthError::TokenExpired)
    }

    /// Whether this error indicates a signature failure.
    #[must_use]
    pub fn is_bad_signature(&self) -> bool {
        matches!(self, AuthError::InvalidSignature)
    }
}
