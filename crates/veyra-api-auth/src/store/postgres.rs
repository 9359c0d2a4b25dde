//! PostgreSQL-backed directory.
//!
//! Email and federated-id uniqueness live in the schema (see
//! `migrations/0001_users.sql`); SQLSTATE 23505 from a racing writer is
//! translated into the typed duplicate conditions callers recover from.

use super::{DirectoryError, UserDirectory};
use crate::models::{Account, NewAccount, Role};
use async_trait::async_trait;
use sqlx::PgPool;
use veyra_core::AccountId;

/// Directory backed by a PostgreSQL pool.
#[derive(Clone)]
pub struct PgDirectory {
    pool: PgPool,
}

impl PgDirectory {
    /// Create a directory over an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Raw row shape; `role` is decoded separately so an unknown name in the
/// table surfaces as a decode error instead of a panic.
#[derive(sqlx::FromRow)]
struct AccountRow {
    id: uuid::Uuid,
    username: String,
    email: String,
    password_hash: String,
    federated_id: Option<String>,
    role: String,
}

impl AccountRow {
    fn into_account(self) -> Result<Account, DirectoryError> {
        let role = Role::resolve(&self.role).ok_or_else(|| {
            DirectoryError::Backend(sqlx::Error::Decode(
                format!("unknown role '{}' in users.role", self.role).into(),
            ))
        })?;
        Ok(Account {
            id: AccountId::from_uuid(self.id),
            username: self.username,
            email: self.email,
            password_hash: self.password_hash,
            federated_id: self.federated_id,
            role,
        })
    }
}

fn map_unique_violation(err: sqlx::Error, email: &str) -> DirectoryError {
    if let sqlx::Error::Database(ref db) = err {
        if db.code().as_deref() == Some("23505") {
            return match db.constraint() {
                Some("users_federated_id_key") => DirectoryError::DuplicateFederatedId,
                _ => DirectoryError::DuplicateEmail {
                    email: email.to_string(),
                },
            };
        }
    }
    DirectoryError::Backend(err)
}

#[async_trait]
impl UserDirectory for PgDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash, federated_id, role
             FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DirectoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash, federated_id, role
             FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn find_by_federated_id(
        &self,
        federated_id: &str,
    ) -> Result<Option<Account>, DirectoryError> {
        let row: Option<AccountRow> = sqlx::query_as(
            "SELECT id, username, email, password_hash, federated_id, role
             FROM users WHERE federated_id = $1",
        )
        .bind(federated_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(AccountRow::into_account).transpose()
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        let id = uuid::Uuid::new_v4();

        let row: AccountRow = sqlx::query_as(
            "INSERT INTO users (id, username, email, password_hash, federated_id, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING id, username, email, password_hash, federated_id, role",
        )
        .bind(id)
        .bind(&account.username)
        .bind(&account.email)
        .bind(&account.password_hash)
        .bind(&account.federated_id)
        .bind(account.role.authority())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, &account.email))?;

        row.into_account()
    }

    async fn link_federated_id(
        &self,
        id: AccountId,
        federated_id: &str,
    ) -> Result<Account, DirectoryError> {
        // Guarded update: a link that is already present is left untouched.
        let row: Option<AccountRow> = sqlx::query_as(
            "UPDATE users SET federated_id = $2
             WHERE id = $1 AND federated_id IS NULL
             RETURNING id, username, email, password_hash, federated_id, role",
        )
        .bind(id.as_uuid())
        .bind(federated_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, ""))?;

        match row {
            Some(row) => row.into_account(),
            // Already linked (or the account vanished); return current state.
            None => self.find_by_id(id).await?.ok_or(DirectoryError::NotFound),
        }
    }
}
