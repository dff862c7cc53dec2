//! Access-control decisions for password operations.
//!
//! Pure functions: no IO, no state, no errors. Denial is reported by the
//! caller, not here.

use std::collections::BTreeSet;

use crate::constants::ROLE_ADMIN;
use crate::principal::Principal;

/// Password operations subject to access control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PasswordOperation {
    /// Change the caller's own password (current password required).
    ChangeOwn,
    /// Administrative reset of another account's password.
    ForceChange,
}

impl PasswordOperation {
    /// Role a principal must hold, if any.
    pub fn required_role(&self) -> Option<&'static str> {
        match self {
            PasswordOperation::ChangeOwn => None,
            PasswordOperation::ForceChange => Some(ROLE_ADMIN),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PasswordOperation::ChangeOwn => "change_own_password",
            PasswordOperation::ForceChange => "force_change_password",
        }
    }
}

/// Any authenticated principal may change its own password.
pub fn can_change_own_password(_principal: &Principal) -> bool {
    true
}

/// Only principals holding the `Admin` role may force a password change.
pub fn can_force_change_password(principal: &Principal) -> bool {
    roles_permit(principal.roles(), PasswordOperation::ForceChange)
}

/// Decide from a role set alone.
pub fn roles_permit(roles: &BTreeSet<String>, operation: PasswordOperation) -> bool {
    match operation.required_role() {
        None => true,
        Some(role) => roles.contains(role),
    }
}

/// Decide for a principal and operation.
pub fn is_permitted(principal: &Principal, operation: PasswordOperation) -> bool {
    match operation {
        PasswordOperation::ChangeOwn => can_change_own_password(principal),
        PasswordOperation::ForceChange => can_force_change_password(principal),
    }
}
