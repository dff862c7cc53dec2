//! Domain-level constants.
//!
//! These constants define business rules and validation requirements.

// =============================================================================
// Roles
// =============================================================================

/// Administrator role, required for forced password changes
pub const ROLE_ADMIN: &str = "Admin";

/// Default role assigned to regular accounts
pub const ROLE_USER: &str = "User";

// =============================================================================
// Password policy defaults
// =============================================================================

/// Minimum password length
pub const DEFAULT_PASSWORD_REQUIRED_LENGTH: usize = 6;

/// Minimum number of distinct characters in a password
pub const DEFAULT_PASSWORD_REQUIRED_UNIQUE_CHARS: usize = 1;

// =============================================================================
// Authentication
// =============================================================================

/// Minimum JWT secret length (security requirement)
pub const MIN_JWT_SECRET_LENGTH: usize = 32;
