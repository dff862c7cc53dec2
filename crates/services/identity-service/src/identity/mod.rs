//! Identity collaborator: account lookups and password writes.

mod manager;

pub use manager::{AccountManager, IdentityManager};

#[cfg(any(test, feature = "test-utils"))]
pub use manager::MockIdentityManager;
