//! Authentication error types and their HTTP classification.
//!
//! Every fallible operation funnels into [`ApiAuthError`]; the
//! `IntoResponse` impl is the single place where errors become status
//! codes and response bodies. Credential failures collapse into one
//! message so responses never reveal whether an email is registered.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

use crate::federation::FederationError;
use crate::store::DirectoryError;

/// Authentication and authorization errors.
#[derive(Debug, Error)]
pub enum ApiAuthError {
    /// An account already exists for the email being registered.
    #[error("Email '{email}' is already registered")]
    EmailTaken { email: String },

    /// Unknown email or wrong password; deliberately indistinguishable.
    #[error("Invalid credentials")]
    BadCredentials,

    /// A configured role name resolves to nothing.
    #[error("Role '{role}' does not exist")]
    RoleNotFound { role: String },

    /// A referenced resource does not exist.
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// The federated provider token failed verification, including the
    /// case where the provider could not be consulted at all.
    #[error("Federated token rejected")]
    BadFederatedToken {
        /// Internal detail; logged, never returned to the client.
        reason: String,
    },

    /// A session token past its expiry.
    #[error("Token has expired")]
    TokenExpired,

    /// A session token whose signature does not verify.
    #[error("Token signature is invalid")]
    TokenBadSignature,

    /// A session token that is not structurally a token.
    #[error("Token is malformed")]
    TokenMalformed,

    /// Request payload failed field validation.
    #[error("Validation failed")]
    Validation {
        /// Field name to violation message.
        errors: BTreeMap<String, String>,
    },

    /// Anything the caller cannot act on.
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Error response body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    /// ISO 8601 UTC timestamp of the failure.
    pub timestamp: String,
    /// Numeric HTTP status.
    pub status: u16,
    /// HTTP reason phrase.
    pub error: String,
    /// Human-readable message, sanitized for external eyes.
    pub message: String,
    /// Request path that produced the error.
    pub path: String,
    /// Per-field violations, present only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_errors: Option<BTreeMap<String, String>>,
}

impl ApiAuthError {
    /// HTTP status this error classifies to.
    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiAuthError::EmailTaken { .. } => StatusCode::CONFLICT,
            ApiAuthError::BadCredentials
            | ApiAuthError::TokenExpired
            | ApiAuthError::TokenBadSignature
            | ApiAuthError::TokenMalformed => StatusCode::UNAUTHORIZED,
            ApiAuthError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiAuthError::BadFederatedToken { .. } => StatusCode::BAD_REQUEST,
            ApiAuthError::Validation { .. } => StatusCode::BAD_REQUEST,
            // A misconfigured role is an operator problem, not the caller's.
            ApiAuthError::RoleNotFound { .. } | ApiAuthError::Internal { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Build the response for this error at a given request path.
    ///
    /// Handlers call this with the request's original URI so the body
    /// echoes the path; the plain `IntoResponse` impl leaves it empty.
    pub fn into_response_at(self, path: &str) -> Response {
        let status = self.status_code();

        let mut validation_errors = None;
        let message = match &self {
            ApiAuthError::Internal { message } => {
                tracing::error!("Internal auth error: {message}");
                "An internal error occurred".to_string()
            }
            ApiAuthError::RoleNotFound { role } => {
                tracing::error!(role = %role, "Configured role does not resolve");
                "An internal error occurred".to_string()
            }
            // Provider-controlled detail never reaches the client.
            ApiAuthError::BadFederatedToken { reason } => {
                tracing::warn!(reason = %reason, "Federated token rejected");
                "Federated token could not be verified".to_string()
            }
            ApiAuthError::Validation { errors } => {
                validation_errors = Some(errors.clone());
                "Validation failed".to_string()
            }
            _ => self.to_string(),
        };

        let body = ErrorBody {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message,
            path: path.to_string(),
            validation_errors,
        };

        (status, axum::Json(body)).into_response()
    }
}

impl IntoResponse for ApiAuthError {
    fn into_response(self) -> Response {
        self.into_response_at("")
    }
}

impl From<DirectoryError> for ApiAuthError {
    fn from(err: DirectoryError) -> Self {
        match err {
            DirectoryError::DuplicateEmail { email } => ApiAuthError::EmailTaken { email },
            DirectoryError::DuplicateFederatedId => ApiAuthError::Internal {
                message: "Federated identity already linked to another account".to_string(),
            },
            DirectoryError::NotFound => ApiAuthError::NotFound {
                resource: "Account".to_string(),
            },
            DirectoryError::Backend(e) => ApiAuthError::Internal {
                message: format!("Directory backend error: {e}"),
            },
        }
    }
}

impl From<FederationError> for ApiAuthError {
    fn from(err: FederationError) -> Self {
        // Provider outages classify with every other federation failure;
        // the distinction survives only in the logged reason.
        ApiAuthError::BadFederatedToken {
            reason: err.to_string(),
        }
    }
}

impl From<veyra_auth::AuthError> for ApiAuthError {
    fn from(err: veyra_auth::AuthError) -> Self {
        use veyra_auth::AuthError;
        match err {
            AuthError::TokenExpired => ApiAuthError::TokenExpired,
            AuthError::InvalidSignature => ApiAuthError::TokenBadSignature,
            AuthError::InvalidToken(_) | AuthError::InvalidAlgorithm | AuthError::MissingClaim(_) => {
                ApiAuthError::TokenMalformed
            }
            AuthError::InvalidKey(e) => ApiAuthError::Internal {
                message: format!("Signing key error: {e}"),
            },
            AuthError::HashingFailed(e) => ApiAuthError::Internal {
                message: format!("Password hashing failed: {e}"),
            },
            AuthError::InvalidHashFormat => ApiAuthError::Internal {
                message: "Stored password hash is not valid".to_string(),
            },
        }
    }
}

/// Result type alias for authentication operations.
pub type ApiAuthResult<T> = Result<T, ApiAuthError>;
