//! Password change business logic.

mod password_service;

pub use password_service::{PasswordChangeService, PasswordChanger};
