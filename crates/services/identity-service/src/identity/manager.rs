//! Identity manager - account-level password operations.
//!
//! This is the identity collaborator the password change flow delegates to.
//! It owns password verification, the complexity policy, hashing, and the
//! concurrency-guarded write. Business failures come back as a failed
//! [`OperationOutcome`]; `Err` is reserved for infrastructure failures.

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::repository::AccountRepository;
use common::{AppError, AppResult};
use domain::{
    normalize_user_name, Account, OperationError, OperationOutcome, Password, PasswordPolicy,
};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Identity collaborator trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait IdentityManager: Send + Sync {
    /// Case-insensitive lookup by user name
    async fn find_account_by_username(&self, user_name: &str) -> AppResult<Option<Account>>;

    /// Verify the current password, then replace it with the new one
    async fn verify_and_change_password(
        &self,
        account_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<OperationOutcome>;

    /// Replace the password without checking the current one
    async fn force_set_password(
        &self,
        user_name: &str,
        new_password: &str,
    ) -> AppResult<OperationOutcome>;

    /// Create an account with a password that satisfies the policy
    async fn create_account(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<Account>;
}

/// Identity manager backed by an [`AccountRepository`].
pub struct AccountManager {
    accounts: Arc<dyn AccountRepository>,
    policy: PasswordPolicy,
}

impl AccountManager {
    pub fn new(accounts: Arc<dyn AccountRepository>, policy: PasswordPolicy) -> Self {
        Self { accounts, policy }
    }

    /// Validate, hash and write a new password for an already loaded account.
    async fn replace_password(
        &self,
        account: &Account,
        new_password: &str,
    ) -> AppResult<OperationOutcome> {
        let violations = self.policy.validate(new_password);
        if !violations.is_empty() {
            return Ok(OperationOutcome::Failed(violations));
        }

        let hash = Password::new(new_password)?.into_string();
        let written = self
            .accounts
            .update_password(account.id, account.concurrency_stamp, hash)
            .await?;

        if written {
            Ok(OperationOutcome::success())
        } else {
            tracing::warn!(account_id = %account.id, "Password write lost a concurrent update");
            Ok(OperationOutcome::failed(OperationError::concurrency_failure()))
        }
    }
}

#[async_trait]
impl IdentityManager for AccountManager {
    async fn find_account_by_username(&self, user_name: &str) -> AppResult<Option<Account>> {
        self.accounts
            .find_by_normalized_user_name(&normalize_user_name(user_name))
            .await
    }

    async fn verify_and_change_password(
        &self,
        account_id: Uuid,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<OperationOutcome> {
        let Some(account) = self.accounts.find_by_id(account_id).await? else {
            return Ok(OperationOutcome::failed(OperationError::user_not_found(
                &account_id.to_string(),
            )));
        };

        if !Password::from_hash(account.password_hash.as_str()).verify(current_password) {
            return Ok(OperationOutcome::failed(OperationError::password_mismatch()));
        }

        self.replace_password(&account, new_password).await
    }

    async fn force_set_password(
        &self,
        user_name: &str,
        new_password: &str,
    ) -> AppResult<OperationOutcome> {
        let Some(account) = self.find_account_by_username(user_name).await? else {
            return Ok(OperationOutcome::failed(OperationError::user_not_found(
                user_name,
            )));
        };

        self.replace_password(&account, new_password).await
    }

    async fn create_account(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> AppResult<Account> {
        let violations = self.policy.validate(password);
        if !violations.is_empty() {
            let reasons: Vec<String> = violations.into_iter().map(|e| e.description).collect();
            return Err(AppError::validation(reasons.join(" ")));
        }

        let hash = Password::new(password)?.into_string();
        let account = Account::new(user_name, email, hash)?;
        self.accounts.create(account).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::{InMemoryAccountStore, MockAccountRepository};
    use domain::OperationErrorCode;

    async fn manager_with_account(
        password: &str,
    ) -> (AccountManager, Arc<InMemoryAccountStore>, Account) {
        let store = Arc::new(InMemoryAccountStore::new());
        let manager = AccountManager::new(store.clone(), PasswordPolicy::default());
        let account = manager
            .create_account("alice", "alice@example.com", password)
            .await
            .unwrap();
        (manager, store, account)
    }

    fn codes(outcome: &OperationOutcome) -> Vec<OperationErrorCode> {
        outcome.errors().iter().map(|e| e.code).collect()
    }

    #[tokio::test]
    async fn test_change_with_correct_current_password() {
        let (manager, store, account) = manager_with_account("Old-Pass1").await;

        let outcome = manager
            .verify_and_change_password(account.id, "Old-Pass1", "New-Pass2")
            .await
            .unwrap();

        assert!(outcome.succeeded());
        let stored = store.find_by_id(account.id).await.unwrap().unwrap();
        assert!(Password::from_hash(stored.password_hash).verify("New-Pass2"));
    }

    #[tokio::test]
    async fn test_mismatch_skips_policy_and_keeps_hash() {
        let (manager, store, account) = manager_with_account("Old-Pass1").await;

        let outcome = manager
            .verify_and_change_password(account.id, "wrong", "weak")
            .await
            .unwrap();

        assert_eq!(codes(&outcome), vec![OperationErrorCode::PasswordMismatch]);
        let stored = store.find_by_id(account.id).await.unwrap().unwrap();
        assert_eq!(stored.password_hash, account.password_hash);
    }

    #[tokio::test]
    async fn test_policy_violations_accumulate() {
        let (manager, _store, account) = manager_with_account("Old-Pass1").await;

        let outcome = manager
            .verify_and_change_password(account.id, "Old-Pass1", "abc")
            .await
            .unwrap();

        assert_eq!(
            codes(&outcome),
            vec![
                OperationErrorCode::PasswordTooShort,
                OperationErrorCode::PasswordRequiresNonAlphanumeric,
                OperationErrorCode::PasswordRequiresDigit,
                OperationErrorCode::PasswordRequiresUpper,
            ]
        );
    }

    #[tokio::test]
    async fn test_unknown_account_id() {
        let (manager, _store, _account) = manager_with_account("Old-Pass1").await;

        let outcome = manager
            .verify_and_change_password(Uuid::new_v4(), "Old-Pass1", "New-Pass2")
            .await
            .unwrap();

        assert_eq!(codes(&outcome), vec![OperationErrorCode::UserNotFound]);
    }

    #[tokio::test]
    async fn test_force_set_is_case_insensitive_on_user_name() {
        let (manager, store, account) = manager_with_account("Old-Pass1").await;

        let outcome = manager.force_set_password("ALICE", "Reset-Pass3").await.unwrap();

        assert!(outcome.succeeded());
        let stored = store.find_by_id(account.id).await.unwrap().unwrap();
        assert!(Password::from_hash(stored.password_hash).verify("Reset-Pass3"));
    }

    #[tokio::test]
    async fn test_lost_race_reports_concurrency_failure() {
        let account = Account::new(
            "dave",
            "dave@example.com",
            Password::new("Old-Pass1").unwrap().into_string(),
        )
        .unwrap();

        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_normalized_user_name()
            .returning(move |_| Ok(Some(account.clone())));
        repo.expect_update_password()
            .times(1)
            .returning(|_, _, _| Ok(false));

        let manager = AccountManager::new(Arc::new(repo), PasswordPolicy::default());
        let outcome = manager.force_set_password("dave", "Reset-Pass3").await.unwrap();

        assert_eq!(codes(&outcome), vec![OperationErrorCode::ConcurrencyFailure]);
    }

    #[tokio::test]
    async fn test_store_error_propagates() {
        let mut repo = MockAccountRepository::new();
        repo.expect_find_by_id()
            .returning(|_| Err(AppError::service_unavailable("accounts")));

        let manager = AccountManager::new(Arc::new(repo), PasswordPolicy::default());
        let result = manager
            .verify_and_change_password(Uuid::new_v4(), "a", "b")
            .await;

        assert!(matches!(result, Err(AppError::ServiceUnavailable(_))));
    }

    #[tokio::test]
    async fn test_create_account_rejects_weak_password() {
        let store = Arc::new(InMemoryAccountStore::new());
        let manager = AccountManager::new(store.clone(), PasswordPolicy::default());

        let result = manager.create_account("erin", "erin@example.com", "weak").await;

        assert!(matches!(result, Err(AppError::Validation(_))));
        assert!(store.is_empty().await);
    }
}
