//! Request payload validation.
//!
//! Field checks run before any directory or hashing work; all violations
//! for a payload are collected into one response rather than reported
//! first-failure-only.

use crate::error::{ApiAuthError, ApiAuthResult};
use crate::models::{LoginRequest, RegisterRequest};
use std::collections::BTreeMap;

/// Longest accepted password; Argon2 input is unbounded but request
/// payloads are not.
const MAX_PASSWORD_LEN: usize = 128;

/// Shortest accepted password.
const MIN_PASSWORD_LEN: usize = 8;

/// Longest accepted username.
const MAX_USERNAME_LEN: usize = 64;

/// Validate a registration payload.
pub fn validate_register(request: &RegisterRequest) -> ApiAuthResult<()> {
    let mut errors = BTreeMap::new();

    if request.username.trim().is_empty() {
        errors.insert("username".to_string(), "Must not be blank".to_string());
    } else if request.username.chars().count() > MAX_USERNAME_LEN {
        errors.insert(
            "username".to_string(),
            format!("Must be at most {MAX_USERNAME_LEN} characters"),
        );
    }

    if !is_plausible_email(&request.email) {
        errors.insert(
            "email".to_string(),
            "Must be a valid email address".to_string(),
        );
    }

    let password_len = request.password.chars().count();
    if !(MIN_PASSWORD_LEN..=MAX_PASSWORD_LEN).contains(&password_len) {
        errors.insert(
            "password".to_string(),
            format!("Must be between {MIN_PASSWORD_LEN} and {MAX_PASSWORD_LEN} characters"),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiAuthError::Validation { errors })
    }
}

/// Validate a login payload.
///
/// Deliberately shallow: shape problems are validation failures, but a
/// well-formed pair that does not match stays a credential failure so the
/// two cannot be told apart from the outside.
pub fn validate_login(request: &LoginRequest) -> ApiAuthResult<()> {
    let mut errors = BTreeMap::new();

    if request.email.trim().is_empty() {
        errors.insert("email".to_string(), "Must not be blank".to_string());
    }
    if request.password.is_empty() {
        errors.insert("password".to_string(), "Must not be blank".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiAuthError::Validation { errors })
    }
}

/// Minimal structural email check: one `@` with a non-empty local part and
/// a dotted domain. Deliverability is not this layer's problem.
fn is_plausible_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && domain.contains('.')
        && !email.chars().any(char::is_whitespace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register(username: &str, email: &str, password: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn valid_registration_passes() {
        assert!(validate_register(&register("ada", "ada@example.com", "longenough")).is_ok());
    }

    #[test]
    fn all_violations_are_collected() {
        let err = validate_register(&register("", "not-an-email", "short")).unwrap_err();
        let ApiAuthError::Validation { errors } = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 3);
        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("email"));
        assert!(errors.contains_key("password"));
    }

    #[test]
    fn email_shapes() {
        assert!(is_plausible_email("a@example.com"));
        assert!(is_plausible_email("first.last@sub.example.co"));
        assert!(!is_plausible_email("plainaddress"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("a@"));
        assert!(!is_plausible_email("a@nodot"));
        assert!(!is_plausible_email("a b@example.com"));
        assert!(!is_plausible_email("a@.example.com"));
    }

    #[test]
    fn password_bounds_are_inclusive() {
        assert!(validate_register(&register("ada", "a@example.com", &"x".repeat(8))).is_ok());
        assert!(validate_register(&register("ada", "a@example.com", &"x".repeat(128))).is_ok());
        assert!(validate_register(&register("ada", "a@example.com", &"x".repeat(7))).is_err());
        assert!(validate_register(&register("ada", "a@example.com", &"x".repeat(129))).is_err());
    }

    #[test]
    fn login_requires_both_fields() {
        let err = validate_login(&LoginRequest {
            email: " ".into(),
            password: String::new(),
        })
        .unwrap_err();
        let ApiAuthError::Validation { errors } = err else {
            panic!("expected validation error");
        };
        assert_eq!(errors.len(), 2);
    }
}
