//! Authentication orchestration.
//!
//! Register, local login and federated login, wired over the directory,
//! the credential hasher, the token service and the configured federated
//! verifier. Uniqueness races are resolved by recovering from the store's
//! duplicate errors, never by in-process locking.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;
use veyra_auth::PasswordHasher;

use crate::config::AuthConfig;
use crate::error::{ApiAuthError, ApiAuthResult};
use crate::federation::{IdentityVerifier, VerifiedIdentity};
use crate::models::{
    Account, AuthResponse, FederatedLoginRequest, LoginRequest, NewAccount, RegisterRequest, Role,
};
use crate::services::{validate_login, validate_register, Principal, TokenService};
use crate::store::{DirectoryError, UserDirectory};

/// The authentication façade handlers call into.
#[derive(Clone)]
pub struct AuthService {
    directory: Arc<dyn UserDirectory>,
    verifier: Arc<dyn IdentityVerifier>,
    hasher: PasswordHasher,
    tokens: TokenService,
    default_role: String,
    federated_default_role: String,
}

impl AuthService {
    /// Wire an authentication service from its collaborators.
    #[must_use]
    pub fn new(
        directory: Arc<dyn UserDirectory>,
        verifier: Arc<dyn IdentityVerifier>,
        hasher: PasswordHasher,
        tokens: TokenService,
        config: &AuthConfig,
    ) -> Self {
        Self {
            directory,
            verifier,
            hasher,
            tokens,
            default_role: config.default_role.clone(),
            federated_default_role: config.federated_default_role.clone(),
        }
    }

    /// Register a local account.
    ///
    /// The pre-check on email gives the common case a clean conflict; the
    /// store's uniqueness constraint catches the race where two
    /// registrations interleave, and both paths classify identically.
    pub async fn register(&self, request: RegisterRequest) -> ApiAuthResult<AuthResponse> {
        validate_register(&request)?;

        if self.directory.find_by_email(&request.email).await?.is_some() {
            return Err(ApiAuthError::EmailTaken {
                email: request.email,
            });
        }

        let role = self.resolve_role(&self.default_role)?;

        let password_hash = self.hasher.hash(&request.password)?;
        let account = self
            .directory
            .insert(NewAccount {
                username: request.username,
                email: request.email,
                password_hash,
                federated_id: None,
                role,
            })
            .await?;

        info!(account_id = %account.id, "Account registered");
        self.respond(account)
    }

    /// Authenticate a local account.
    ///
    /// Unknown email and wrong password are indistinguishable from the
    /// outside.
    pub async fn login(&self, request: LoginRequest) -> ApiAuthResult<AuthResponse> {
        validate_login(&request)?;

        let account = self
            .directory
            .find_by_email(&request.email)
            .await?
            .ok_or(ApiAuthError::BadCredentials)?;

        if !self.hasher.verify(&request.password, &account.password_hash)? {
            warn!(account_id = %account.id, "Password verification failed");
            return Err(ApiAuthError::BadCredentials);
        }

        info!(account_id = %account.id, "Local login");
        self.respond(account)
    }

    /// Authenticate with a federated provider token.
    ///
    /// Resolution order: an account already linked to the provider subject
    /// wins; otherwise an account with the asserted email is linked
    /// (first federated login only, the link is permanent); otherwise a new
    /// account is provisioned.
    pub async fn federated_login(
        &self,
        request: FederatedLoginRequest,
    ) -> ApiAuthResult<AuthResponse> {
        let identity = self.verifier.verify(&request.token).await?;

        if let Some(account) = self.directory.find_by_federated_id(&identity.subject).await? {
            info!(account_id = %account.id, strategy = %self.verifier.strategy(), "Federated login");
            return self.respond(account);
        }

        if let Some(account) = self.directory.find_by_email(&identity.email).await? {
            let account = self
                .directory
                .link_federated_id(account.id, &identity.subject)
                .await?;
            info!(account_id = %account.id, "Federated identity linked to existing account");
            return self.respond(account);
        }

        let account = self.provision_federated(&identity).await?;
        self.respond(account)
    }

    /// Validate a session token and derive the request principal.
    pub fn authenticate_token(&self, token: &str) -> ApiAuthResult<Principal> {
        let claims = self.tokens.validate(token)?;
        Ok(Principal::from(claims))
    }

    /// Create an account for a first-time federated identity.
    async fn provision_federated(&self, identity: &VerifiedIdentity) -> ApiAuthResult<Account> {
        let role = self.resolve_role(&self.federated_default_role)?;
        let username = identity
            .display_name
            .clone()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| local_part(&identity.email).to_string());

        // Federation-only accounts get an unguessable local credential so
        // the password path stays closed for them.
        let password_hash = self.hasher.hash(&Uuid::new_v4().to_string())?;

        let inserted = self
            .directory
            .insert(NewAccount {
                username,
                email: identity.email.clone(),
                password_hash,
                federated_id: Some(identity.subject.clone()),
                role,
            })
            .await;

        match inserted {
            Ok(account) => {
                info!(account_id = %account.id, "Federated account provisioned");
                Ok(account)
            }
            // Lost a race with a concurrent signup for the same email or
            // subject; whoever won holds the account we wanted.
            Err(DirectoryError::DuplicateEmail { .. }) => {
                let account = self
                    .directory
                    .find_by_email(&identity.email)
                    .await?
                    .ok_or(ApiAuthError::Internal {
                        message: "Account vanished after duplicate-email race".to_string(),
                    })?;
                self.directory
                    .link_federated_id(account.id, &identity.subject)
                    .await
                    .map_err(Into::into)
            }
            Err(DirectoryError::DuplicateFederatedId) => self
                .directory
                .find_by_federated_id(&identity.subject)
                .await?
                .ok_or(ApiAuthError::Internal {
                    message: "Account vanished after duplicate-subject race".to_string(),
                }),
            Err(other) => Err(other.into()),
        }
    }

    fn resolve_role(&self, name: &str) -> ApiAuthResult<Role> {
        Role::resolve(name).ok_or_else(|| ApiAuthError::RoleNotFound {
            role: name.to_string(),
        })
    }

    fn respond(&self, account: Account) -> ApiAuthResult<AuthResponse> {
        let token = self.tokens.issue(&account)?;
        Ok(AuthResponse {
            id: account.id,
            username: account.username,
            email: account.email,
            token,
        })
    }
}

/// The part of an email address before the `@`.
fn local_part(email: &str) -> &str {
    email.split('@').next().unwrap_or(email)
}
