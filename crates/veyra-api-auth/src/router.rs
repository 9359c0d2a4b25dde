//! Authentication router.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers;
use crate::services::AuthService;

/// Shared state for the authentication routes.
#[derive(Clone)]
pub struct AppState {
    /// The authentication façade.
    pub auth: AuthService,
}

/// Build the `/auth` router.
pub fn auth_router(state: AppState) -> Router {
    Router::new()
        .route("/auth/register", post(handlers::register))
        .route("/auth/login", post(handlers::login))
        .route("/auth/federated", post(handlers::federated_login))
        .route("/auth/me", get(handlers::me))
        .with_state(state)
}
