//! Request and response shapes for the authentication boundary.

use serde::{Deserialize, Serialize};
use veyra_core::AccountId;

/// `POST /auth/register` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// `POST /auth/login` request body.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// `POST /auth/federated` request body: an opaque provider-issued token.
#[derive(Debug, Clone, Deserialize)]
pub struct FederatedLoginRequest {
    pub token: String,
}

/// Successful authentication response, shared by all three operations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub id: AccountId,
    pub username: String,
    pub email: String,
    pub token: String,
}
