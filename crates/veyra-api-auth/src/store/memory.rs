//! In-memory directory used by tests and local development.
//!
//! Enforces the same uniqueness guarantees as the PostgreSQL directory so
//! race-recovery paths behave identically against either backend.

use super::{DirectoryError, UserDirectory};
use crate::models::{Account, NewAccount};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use veyra_core::AccountId;

/// Directory backed by a process-local map.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    accounts: Mutex<HashMap<AccountId, Account>>,
}

impl InMemoryDirectory {
    /// Create an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub fn len(&self) -> usize {
        self.accounts.lock().expect("directory lock poisoned").len()
    }

    /// Whether the directory holds no accounts.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl UserDirectory for InMemoryDirectory {
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, DirectoryError> {
        let accounts = self.accounts.lock().expect("directory lock poisoned");
        Ok(accounts.values().find(|a| a.email == email).cloned())
    }

    async fn find_by_id(&self, id: AccountId) -> Result<Option<Account>, DirectoryError> {
        let accounts = self.accounts.lock().expect("directory lock poisoned");
        Ok(accounts.get(&id).cloned())
    }

    async fn find_by_federated_id(
        &self,
        federated_id: &str,
    ) -> Result<Option<Account>, DirectoryError> {
        let accounts = self.accounts.lock().expect("directory lock poisoned");
        Ok(accounts
            .values()
            .find(|a| a.federated_id.as_deref() == Some(federated_id))
            .cloned())
    }

    async fn insert(&self, account: NewAccount) -> Result<Account, DirectoryError> {
        let mut accounts = self.accounts.lock().expect("directory lock poisoned");

        if accounts.values().any(|a| a.email == account.email) {
            return Err(DirectoryError::DuplicateEmail {
                email: account.email,
            });
        }
        if let Some(ref fid) = account.federated_id {
            if accounts
                .values()
                .any(|a| a.federated_id.as_deref() == Some(fid))
            {
                return Err(DirectoryError::DuplicateFederatedId);
            }
        }

        let stored = Account {
            id: AccountId::new(),
            username: account.username,
            email: account.email,
            password_hash: account.password_hash,
            federated_id: account.federated_id,
            role: account.role,
        };
        accounts.insert(stored.id, stored.clone());
        Ok(stored)
    }

    async fn link_federated_id(
        &self,
        id: AccountId,
        federated_id: &str,
    ) -> Result<Account, DirectoryError> {
        let mut accounts = self.accounts.lock().expect("directory lock poisoned");

        let taken = accounts
            .values()
            .any(|a| a.id != id && a.federated_id.as_deref() == Some(federated_id));
        if taken {
            return Err(DirectoryError::DuplicateFederatedId);
        }

        let account = accounts.get_mut(&id).ok_or(DirectoryError::NotFound)?;
        if account.federated_id.is_none() {
            account.federated_id = Some(federated_id.to_string());
        }
        Ok(account.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;

    fn new_account(email: &str) -> NewAccount {
        NewAccount {
            username: "someone".into(),
            email: email.into(),
            password_hash: "$argon2id$stub".into(),
            federated_id: None,
            role: Role::User,
        }
    }

    #[tokio::test]
    async fn insert_assigns_id_and_is_findable() {
        let dir = InMemoryDirectory::new();
        let stored = dir.insert(new_account("a@example.com")).await.unwrap();

        let by_email = dir.find_by_email("a@example.com").await.unwrap().unwrap();
        let by_id = dir.find_by_id(stored.id).await.unwrap().unwrap();
        assert_eq!(by_email, stored);
        assert_eq!(by_id, stored);
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected_by_the_store() {
        let dir = InMemoryDirectory::new();
        dir.insert(new_account("a@example.com")).await.unwrap();

        let err = dir.insert(new_account("a@example.com")).await.unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateEmail { .. }));
        assert_eq!(dir.len(), 1);
    }

    #[tokio::test]
    async fn federation_link_is_set_once_and_kept() {
        let dir = InMemoryDirectory::new();
        let stored = dir.insert(new_account("a@example.com")).await.unwrap();

        let linked = dir.link_federated_id(stored.id, "sub-1").await.unwrap();
        assert_eq!(linked.federated_id.as_deref(), Some("sub-1"));

        // Replay does not reassign.
        let relinked = dir.link_federated_id(stored.id, "sub-2").await.unwrap();
        assert_eq!(relinked.federated_id.as_deref(), Some("sub-1"));
    }

    #[tokio::test]
    async fn federated_id_is_unique_across_accounts() {
        let dir = InMemoryDirectory::new();
        let first = dir.insert(new_account("a@example.com")).await.unwrap();
        dir.link_federated_id(first.id, "sub-1").await.unwrap();

        let second = dir.insert(new_account("b@example.com")).await.unwrap();
        let err = dir.link_federated_id(second.id, "sub-1").await.unwrap_err();
        assert!(matches!(err, DirectoryError::DuplicateFederatedId));
    }

    #[tokio::test]
    async fn linking_a_missing_account_fails() {
        let dir = InMemoryDirectory::new();
        let err = dir
            .link_federated_id(AccountId::new(), "sub-1")
            .await
            .unwrap_err();
        assert!(matches!(err, DirectoryError::NotFound));
    }
}
