//! HTTP handlers for the authentication routes.
//!
//! Thin by intent: deserialize, call the service, classify. All policy
//! lives in [`crate::services`].

use axum::extract::{OriginalUri, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::error::ApiAuthError;
use crate::models::{FederatedLoginRequest, LoginRequest, RegisterRequest};
use crate::router::AppState;

/// `POST /auth/register`
pub async fn register(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<RegisterRequest>,
) -> Response {
    match state.auth.register(request).await {
        Ok(body) => (StatusCode::CREATED, Json(body)).into_response(),
        Err(err) => err.into_response_at(uri.path()),
    }
}

/// `POST /auth/login`
pub async fn login(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<LoginRequest>,
) -> Response {
    match state.auth.login(request).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => err.into_response_at(uri.path()),
    }
}

/// `POST /auth/federated`
pub async fn federated_login(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    Json(request): Json<FederatedLoginRequest>,
) -> Response {
    match state.auth.federated_login(request).await {
        Ok(body) => (StatusCode::OK, Json(body)).into_response(),
        Err(err) => err.into_response_at(uri.path()),
    }
}

/// `GET /auth/me` response body.
#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub subject: String,
    pub authorities: Vec<String>,
}

/// `GET /auth/me` — whoami for a bearer session token.
pub async fn me(
    State(state): State<AppState>,
    OriginalUri(uri): OriginalUri,
    headers: HeaderMap,
) -> Response {
    let token = match bearer_token(&headers) {
        Some(token) => token,
        None => return ApiAuthError::TokenMalformed.into_response_at(uri.path()),
    };

    match state.auth.authenticate_token(token) {
        Ok(principal) => Json(MeResponse {
            subject: principal.subject,
            authorities: principal.authorities,
        })
        .into_response(),
        Err(err) => err.into_response_at(uri.path()),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}
