//! Application state shared by all handlers.

use std::sync::Arc;

use crate::repository::AccountRepository;
use crate::service::PasswordChangeService;
use crate::token::TokenVerifier;

#[derive(Clone)]
pub struct AppState {
    pub password_service: Arc<dyn PasswordChangeService>,
    pub token_verifier: Arc<TokenVerifier>,
    /// Account store, used for health reporting
    pub accounts: Arc<dyn AccountRepository>,
}

impl AppState {
    pub fn new(
        password_service: Arc<dyn PasswordChangeService>,
        token_verifier: Arc<TokenVerifier>,
        accounts: Arc<dyn AccountRepository>,
    ) -> Self {
        Self {
            password_service,
            token_verifier,
            accounts,
        }
    }
}
