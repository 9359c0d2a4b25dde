//! Domain model and boundary DTOs.

mod account;
mod dto;

pub use account::{Account, NewAccount, Role};
pub use dto::{AuthResponse, FederatedLoginRequest, LoginRequest, RegisterRequest};
