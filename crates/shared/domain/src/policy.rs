//! Password complexity policy.
//!
//! Every violated rule is reported, in a fixed order, so a caller can show
//! all problems with a candidate password at once.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PASSWORD_REQUIRED_LENGTH, DEFAULT_PASSWORD_REQUIRED_UNIQUE_CHARS};
use crate::outcome::OperationError;

/// Complexity rules applied to new passwords.
///
/// Character classes are ASCII only: a non-ASCII letter counts as
/// non-alphanumeric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    pub required_length: usize,
    pub required_unique_chars: usize,
    pub require_non_alphanumeric: bool,
    pub require_digit: bool,
    pub require_lowercase: bool,
    pub require_uppercase: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            required_length: DEFAULT_PASSWORD_REQUIRED_LENGTH,
            required_unique_chars: DEFAULT_PASSWORD_REQUIRED_UNIQUE_CHARS,
            require_non_alphanumeric: true,
            require_digit: true,
            require_lowercase: true,
            require_uppercase: true,
        }
    }
}

impl PasswordPolicy {
    /// Check a candidate password, returning every violated rule.
    pub fn validate(&self, password: &str) -> Vec<OperationError> {
        let mut errors = Vec::new();

        if password.chars().count() < self.required_length {
            errors.push(OperationError::password_too_short(self.required_length));
        }
        if self.require_non_alphanumeric && password.chars().all(|c| c.is_ascii_alphanumeric()) {
            errors.push(OperationError::password_requires_non_alphanumeric());
        }
        if self.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
            errors.push(OperationError::password_requires_digit());
        }
        if self.require_lowercase && !password.chars().any(|c| c.is_ascii_lowercase()) {
            errors.push(OperationError::password_requires_lower());
        }
        if self.require_uppercase && !password.chars().any(|c| c.is_ascii_uppercase()) {
            errors.push(OperationError::password_requires_upper());
        }
        if distinct_chars(password) < self.required_unique_chars {
            errors.push(OperationError::password_requires_unique_chars(
                self.required_unique_chars,
            ));
        }

        errors
    }

    /// Whether a candidate password satisfies every rule.
    pub fn is_satisfied_by(&self, password: &str) -> bool {
        self.validate(password).is_empty()
    }
}

fn distinct_chars(password: &str) -> usize {
    let mut seen: Vec<char> = password.chars().collect();
    seen.sort_unstable();
    seen.dedup();
    seen.len()
}
