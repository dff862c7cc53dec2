//! Structured result of a password operation.
//!
//! A failed outcome carries every reason the operation was rejected, in the
//! order they were detected, so callers can report them all at once.

use serde::{Deserialize, Serialize};

/// Machine-readable failure reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum OperationErrorCode {
    PasswordRequired,
    PasswordMismatch,
    PasswordTooShort,
    PasswordRequiresNonAlphanumeric,
    PasswordRequiresDigit,
    PasswordRequiresLower,
    PasswordRequiresUpper,
    PasswordRequiresUniqueChars,
    UserNotFound,
    ConcurrencyFailure,
    StoreUnavailable,
}

impl OperationErrorCode {
    /// Stable string form used in logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationErrorCode::PasswordRequired => "PasswordRequired",
            OperationErrorCode::PasswordMismatch => "PasswordMismatch",
            OperationErrorCode::PasswordTooShort => "PasswordTooShort",
            OperationErrorCode::PasswordRequiresNonAlphanumeric => {
                "PasswordRequiresNonAlphanumeric"
            }
            OperationErrorCode::PasswordRequiresDigit => "PasswordRequiresDigit",
            OperationErrorCode::PasswordRequiresLower => "PasswordRequiresLower",
            OperationErrorCode::PasswordRequiresUpper => "PasswordRequiresUpper",
            OperationErrorCode::PasswordRequiresUniqueChars => "PasswordRequiresUniqueChars",
            OperationErrorCode::UserNotFound => "UserNotFound",
            OperationErrorCode::ConcurrencyFailure => "ConcurrencyFailure",
            OperationErrorCode::StoreUnavailable => "StoreUnavailable",
        }
    }
}

impl std::fmt::Display for OperationErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single failure reason with a human-readable description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct OperationError {
    pub code: OperationErrorCode,
    #[cfg_attr(feature = "openapi", schema(example = "Incorrect password."))]
    pub description: String,
}

impl OperationError {
    pub fn new(code: OperationErrorCode, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
        }
    }

    /// A required password field was empty.
    pub fn password_required(field: &str) -> Self {
        Self::new(
            OperationErrorCode::PasswordRequired,
            format!("The {} field is required.", field),
        )
    }

    pub fn password_mismatch() -> Self {
        Self::new(OperationErrorCode::PasswordMismatch, "Incorrect password.")
    }

    pub fn password_too_short(required_length: usize) -> Self {
        Self::new(
            OperationErrorCode::PasswordTooShort,
            format!("Passwords must be at least {} characters.", required_length),
        )
    }

    pub fn password_requires_non_alphanumeric() -> Self {
        Self::new(
            OperationErrorCode::PasswordRequiresNonAlphanumeric,
            "Passwords must have at least one non alphanumeric character.",
        )
    }

    pub fn password_requires_digit() -> Self {
        Self::new(
            OperationErrorCode::PasswordRequiresDigit,
            "Passwords must have at least one digit ('0'-'9').",
        )
    }

    pub fn password_requires_lower() -> Self {
        Self::new(
            OperationErrorCode::PasswordRequiresLower,
            "Passwords must have at least one lowercase ('a'-'z').",
        )
    }

    pub fn password_requires_upper() -> Self {
        Self::new(
            OperationErrorCode::PasswordRequiresUpper,
            "Passwords must have at least one uppercase ('A'-'Z').",
        )
    }

    pub fn password_requires_unique_chars(unique_chars: usize) -> Self {
        Self::new(
            OperationErrorCode::PasswordRequiresUniqueChars,
            format!(
                "Passwords must use at least {} different characters.",
                unique_chars
            ),
        )
    }

    pub fn user_not_found(user_name: &str) -> Self {
        Self::new(
            OperationErrorCode::UserNotFound,
            format!("User '{}' was not found.", user_name),
        )
    }

    pub fn concurrency_failure() -> Self {
        Self::new(
            OperationErrorCode::ConcurrencyFailure,
            "Optimistic concurrency failure, object has been modified.",
        )
    }

    pub fn store_unavailable() -> Self {
        Self::new(
            OperationErrorCode::StoreUnavailable,
            "The identity store is unavailable.",
        )
    }
}

/// Success or an ordered, non-empty list of failure reasons.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationOutcome {
    Succeeded,
    Failed(Vec<OperationError>),
}

impl OperationOutcome {
    pub fn success() -> Self {
        OperationOutcome::Succeeded
    }

    /// Build a failed outcome from a single reason.
    pub fn failed(error: OperationError) -> Self {
        OperationOutcome::Failed(vec![error])
    }

    /// Build an outcome from accumulated reasons; no reasons means success.
    pub fn from_errors(errors: Vec<OperationError>) -> Self {
        if errors.is_empty() {
            OperationOutcome::Succeeded
        } else {
            OperationOutcome::Failed(errors)
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self, OperationOutcome::Succeeded)
    }

    /// Failure reasons in detection order (empty on success).
    pub fn errors(&self) -> &[OperationError] {
        match self {
            OperationOutcome::Succeeded => &[],
            OperationOutcome::Failed(errors) => errors,
        }
    }

    /// Comma-separated error codes, for log fields.
    pub fn error_codes(&self) -> String {
        self.errors()
            .iter()
            .map(|e| e.code.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn into_errors(self) -> Vec<OperationError> {
        match self {
            OperationOutcome::Succeeded => Vec::new(),
            OperationOutcome::Failed(errors) => errors,
        }
    }
}
