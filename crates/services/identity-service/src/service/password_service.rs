//! Password change service - Runs authorized password changes.
//!
//! Callers are expected to have passed the access-control check for the
//! operation already; nothing is re-checked here. Every call yields an
//! [`OperationOutcome`], and collaborator failures are folded into it as a
//! `StoreUnavailable` entry.

use std::sync::Arc;

use async_trait::async_trait;

use crate::identity::IdentityManager;
use domain::{OperationError, OperationOutcome, Principal};

/// Password change service trait for dependency injection.
#[async_trait]
pub trait PasswordChangeService: Send + Sync {
    /// Change the caller's own password after verifying the current one
    async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: &str,
    ) -> OperationOutcome;

    /// Administrative reset of another account's password
    async fn force_change_password(
        &self,
        user_name: &str,
        new_password: &str,
    ) -> OperationOutcome;
}

/// Concrete implementation of PasswordChangeService over an identity manager.
pub struct PasswordChanger {
    identity: Arc<dyn IdentityManager>,
}

impl PasswordChanger {
    pub fn new(identity: Arc<dyn IdentityManager>) -> Self {
        Self { identity }
    }
}

#[async_trait]
impl PasswordChangeService for PasswordChanger {
    async fn change_password(
        &self,
        principal: &Principal,
        current_password: &str,
        new_password: &str,
    ) -> OperationOutcome {
        let mut missing = Vec::new();
        if current_password.is_empty() {
            missing.push(OperationError::password_required("currentPassword"));
        }
        if new_password.is_empty() {
            missing.push(OperationError::password_required("newPassword"));
        }
        if !missing.is_empty() {
            return OperationOutcome::Failed(missing);
        }

        let outcome = match self
            .identity
            .verify_and_change_password(principal.id(), current_password, new_password)
            .await
        {
            Ok(outcome) => outcome,
            Err(e) => {
                tracing::error!(
                    user_id = %principal.id(),
                    error = %e,
                    "Identity store failed during password change"
                );
                OperationOutcome::failed(OperationError::store_unavailable())
            }
        };

        if outcome.succeeded() {
            tracing::info!(user_id = %principal.id(), "Password changed");
        } else {
            tracing::warn!(
                user_id = %principal.id(),
                errors = %outcome.error_codes(),
                "Password change failed"
            );
        }

        outcome
    }

    async fn force_change_password(
        &self,
        user_name: &str,
        new_password: &str,
    ) -> OperationOutcome {
        if new_password.is_empty() {
            return OperationOutcome::failed(OperationError::password_required("newPassword"));
        }

        let outcome = match self.identity.find_account_by_username(user_name).await {
            Ok(None) => OperationOutcome::failed(OperationError::user_not_found(user_name)),
            Ok(Some(_)) => match self
                .identity
                .force_set_password(user_name, new_password)
                .await
            {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::error!(
                        user_name,
                        error = %e,
                        "Identity store failed during forced password change"
                    );
                    OperationOutcome::failed(OperationError::store_unavailable())
                }
            },
            Err(e) => {
                tracing::error!(
                    user_name,
                    error = %e,
                    "Identity store failed during account lookup"
                );
                OperationOutcome::failed(OperationError::store_unavailable())
            }
        };

        if outcome.succeeded() {
            tracing::info!(user_name, "Password force-changed");
        } else {
            tracing::warn!(
                user_name,
                errors = %outcome.error_codes(),
                "Forced password change failed"
            );
        }

        outcome
    }
}
