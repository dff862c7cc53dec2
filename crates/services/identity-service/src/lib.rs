//! Identity Service Library
//!
//! Password change and administrative password reset over HTTP. It can be
//! run as a standalone binary or embedded by another host process.

pub mod api;
pub mod config;
pub mod identity;
pub mod infra;
pub mod repository;
pub mod service;
pub mod token;

use std::error::Error;
use std::sync::Arc;

use tracing::info;

use crate::api::{create_router, AppState};
use crate::config::{ConfigError, IdentityServiceConfig, SeedAccount};
use crate::identity::{AccountManager, IdentityManager};
use crate::infra::Database;
use crate::repository::{AccountRepository, AccountStore, InMemoryAccountStore};
use crate::service::PasswordChanger;
use crate::token::TokenVerifier;
use common::AppResult;

/// Run the identity service as an embedded component.
///
/// `host` and `port` override the configured bind address when given.
pub async fn run_embedded(
    host: Option<String>,
    port: Option<u16>,
) -> Result<(), Box<dyn Error>> {
    let mut config = IdentityServiceConfig::from_env()?;
    if let Some(host) = host {
        config.service.host = host;
    }
    if let Some(port) = port {
        config.service.port = port;
    }
    run_server_with_config(config).await
}

/// Run migrations (for CLI commands).
pub async fn run_migrations(action: MigrateAction) -> Result<(), Box<dyn Error>> {
    let config = IdentityServiceConfig::from_env()?;
    let database = config
        .database
        .ok_or(ConfigError::Missing("DATABASE_URL"))?;
    let db = Database::connect_without_migrations(&database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Wire the service graph on top of an account store.
pub async fn build_state(
    accounts: Arc<dyn AccountRepository>,
    config: &IdentityServiceConfig,
) -> AppResult<AppState> {
    let identity: Arc<dyn IdentityManager> = Arc::new(AccountManager::new(
        accounts.clone(),
        config.password_policy.clone(),
    ));

    if let Some(seed) = &config.seed {
        seed_account(identity.as_ref(), seed).await?;
    }

    let password_service = Arc::new(PasswordChanger::new(identity));
    let token_verifier = Arc::new(TokenVerifier::new(&config.jwt)?);

    Ok(AppState::new(password_service, token_verifier, accounts))
}

/// Create the seed account unless one with the same user name exists.
async fn seed_account(identity: &dyn IdentityManager, seed: &SeedAccount) -> AppResult<()> {
    if identity
        .find_account_by_username(&seed.user_name)
        .await?
        .is_some()
    {
        tracing::debug!(user_name = %seed.user_name, "Seed account already present");
        return Ok(());
    }

    let account = identity
        .create_account(&seed.user_name, &seed.email, &seed.password)
        .await?;
    info!(user_id = %account.id, user_name = %account.user_name, "Seed account created");
    Ok(())
}

/// Run the HTTP server with the given configuration.
async fn run_server_with_config(config: IdentityServiceConfig) -> Result<(), Box<dyn Error>> {
    let accounts: Arc<dyn AccountRepository> = match &config.database {
        Some(database) => {
            let db = Database::connect(database).await?;
            Arc::new(AccountStore::new(db.get_connection()))
        }
        None => {
            tracing::warn!("DATABASE_URL not set, accounts are kept in memory");
            Arc::new(InMemoryAccountStore::new())
        }
    };

    let state = build_state(accounts, &config).await?;
    let app = create_router(state);

    let addr = config.service.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Identity service listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
