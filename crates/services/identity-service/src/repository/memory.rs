//! In-memory account repository.
//!
//! Used when no database is configured, and by tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::AccountRepository;
use common::{AppError, AppResult};
use domain::Account;

#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored accounts.
    pub async fn len(&self) -> usize {
        self.accounts.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.accounts.read().await.is_empty()
    }
}

#[async_trait]
impl AccountRepository for InMemoryAccountStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        Ok(self.accounts.read().await.get(&id).cloned())
    }

    async fn find_by_normalized_user_name(
        &self,
        normalized_user_name: &str,
    ) -> AppResult<Option<Account>> {
        let accounts = self.accounts.read().await;
        Ok(accounts
            .values()
            .find(|a| a.normalized_user_name == normalized_user_name)
            .cloned())
    }

    async fn create(&self, account: Account) -> AppResult<Account> {
        let mut accounts = self.accounts.write().await;

        let duplicate = accounts.contains_key(&account.id)
            || accounts
                .values()
                .any(|a| a.normalized_user_name == account.normalized_user_name);
        if duplicate {
            return Err(AppError::conflict("Account"));
        }

        accounts.insert(account.id, account.clone());
        Ok(account)
    }

    async fn update_password(
        &self,
        id: Uuid,
        expected_stamp: Uuid,
        password_hash: String,
    ) -> AppResult<bool> {
        let mut accounts = self.accounts.write().await;

        match accounts.get_mut(&id) {
            Some(account) if account.concurrency_stamp == expected_stamp => {
                account.set_password_hash(password_hash);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn ping(&self) -> AppResult<()> {
        Ok(())
    }
}
