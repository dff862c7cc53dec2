//! Account domain entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{DomainError, DomainResult};

/// Account record held by the identity store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub user_name: String,
    /// Upper-cased user name, used for case-insensitive lookups
    pub normalized_user_name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    /// Rotated on every password write; used for optimistic concurrency
    pub concurrency_stamp: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Account {
    /// Create a new account with a fresh id and concurrency stamp.
    pub fn new(user_name: &str, email: &str, password_hash: String) -> DomainResult<Self> {
        let user_name = user_name.trim();
        if user_name.is_empty() {
            return Err(DomainError::validation("User name cannot be empty"));
        }

        let now = Utc::now();
        Ok(Self {
            id: Uuid::new_v4(),
            user_name: user_name.to_string(),
            normalized_user_name: normalize_user_name(user_name),
            email: email.trim().to_string(),
            password_hash,
            concurrency_stamp: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Replace the password hash and rotate the concurrency stamp.
    pub fn set_password_hash(&mut self, password_hash: String) {
        self.password_hash = password_hash;
        self.concurrency_stamp = Uuid::new_v4();
        self.updated_at = Utc::now();
    }
}

/// Normalized form of a user name for lookups.
pub fn normalize_user_name(user_name: &str) -> String {
    user_name.trim().to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_account_normalizes_user_name() {
        let account = Account::new("  alice ", "alice@example.com", "hash".into()).unwrap();

        assert_eq!(account.user_name, "alice");
        assert_eq!(account.normalized_user_name, "ALICE");
    }

    #[test]
    fn test_empty_user_name_rejected() {
        assert!(Account::new("   ", "x@example.com", "hash".into()).is_err());
    }

    #[test]
    fn test_set_password_hash_rotates_stamp() {
        let mut account = Account::new("bob", "bob@example.com", "old".into()).unwrap();
        let stamp = account.concurrency_stamp;

        account.set_password_hash("new".into());

        assert_eq!(account.password_hash, "new");
        assert_ne!(account.concurrency_stamp, stamp);
    }

    #[test]
    fn test_hash_not_serialized() {
        let account = Account::new("carol", "carol@example.com", "secret-hash".into()).unwrap();
        let json = serde_json::to_string(&account).unwrap();

        assert!(!json.contains("secret-hash"));
    }
}
