//! Session token and credential hashing capabilities for veyra.
//!
//! This crate provides:
//! - RS256 session token encoding and decoding with subject and authority claims
//! - Argon2id password hashing with OWASP-recommended parameters
//!
//! Both are pure, process-local capabilities: token operations are CPU-only
//! and stateless, and hashing touches no state beyond the OS RNG.

mod claims;
mod error;
mod jwt;
mod password;

pub use claims::{SessionClaims, SessionClaimsBuilder};
pub use error::AuthError;
pub use jwt::{decode_token, decode_token_with_config, encode_token, ValidationConfig};
pub use password::{hash_password, verify_password, PasswordHasher};
