//! Domain layer - Core identity types and access-control rules.
//!
//! This crate contains pure domain logic with no infrastructure dependencies:
//! principals and claims, password hashing and complexity policy, operation
//! outcomes, and the authorization decisions for password operations.

pub mod account;
pub mod authz;
pub mod constants;
pub mod error;
pub mod outcome;
pub mod password;
pub mod policy;
pub mod principal;

pub use account::{normalize_user_name, Account};
pub use authz::{
    can_change_own_password, can_force_change_password, is_permitted, roles_permit,
    PasswordOperation,
};
pub use constants::*;
pub use error::{DomainError, DomainResult};
pub use outcome::{OperationError, OperationErrorCode, OperationOutcome};
pub use password::Password;
pub use policy::PasswordPolicy;
pub use principal::{Claim, Principal};
