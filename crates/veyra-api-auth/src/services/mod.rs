//! Authentication services.

mod auth_service;
mod principal;
mod token_service;
mod validation;

pub use auth_service::AuthService;
pub use principal::Principal;
pub use token_service::TokenService;
pub use validation::{validate_login, validate_register};
