//! Account repository implementation.

use async_trait::async_trait;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection,
    EntityTrait, QueryFilter, Set, SqlErr, Statement,
};
use uuid::Uuid;

use super::entities::account::{self, ActiveModel, Entity as AccountEntity};
use common::{AppError, AppResult};
use domain::Account;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Account repository trait for dependency injection.
///
/// Password writes are guarded by the account's concurrency stamp: a write
/// only applies if the stored stamp still matches the one the caller read.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Find account by ID
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>>;

    /// Find account by normalized (upper-cased) user name
    async fn find_by_normalized_user_name(
        &self,
        normalized_user_name: &str,
    ) -> AppResult<Option<Account>>;

    /// Insert a new account; fails with `Conflict` on a duplicate user name
    async fn create(&self, account: Account) -> AppResult<Account>;

    /// Replace the password hash if `expected_stamp` still matches.
    ///
    /// Returns `false` when the stamp changed or the account no longer exists.
    async fn update_password(
        &self,
        id: Uuid,
        expected_stamp: Uuid,
        password_hash: String,
    ) -> AppResult<bool>;

    /// Check store connectivity
    async fn ping(&self) -> AppResult<()>;
}

/// PostgreSQL-backed account repository.
pub struct AccountStore {
    db: DatabaseConnection,
}

impl AccountStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AccountRepository for AccountStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Account>> {
        let result = AccountEntity::find_by_id(id)
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn find_by_normalized_user_name(
        &self,
        normalized_user_name: &str,
    ) -> AppResult<Option<Account>> {
        let result = AccountEntity::find()
            .filter(account::Column::NormalizedUserName.eq(normalized_user_name))
            .one(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.map(Account::from))
    }

    async fn create(&self, account: Account) -> AppResult<Account> {
        let active_model = ActiveModel {
            id: Set(account.id),
            user_name: Set(account.user_name),
            normalized_user_name: Set(account.normalized_user_name),
            email: Set(account.email),
            password_hash: Set(account.password_hash),
            concurrency_stamp: Set(account.concurrency_stamp),
            created_at: Set(account.created_at),
            updated_at: Set(account.updated_at),
        };

        match active_model.insert(&self.db).await {
            Ok(model) => Ok(Account::from(model)),
            Err(err) => match err.sql_err() {
                Some(SqlErr::UniqueConstraintViolation(_)) => Err(AppError::conflict("Account")),
                _ => Err(AppError::from(err)),
            },
        }
    }

    async fn update_password(
        &self,
        id: Uuid,
        expected_stamp: Uuid,
        password_hash: String,
    ) -> AppResult<bool> {
        let result = AccountEntity::update_many()
            .col_expr(account::Column::PasswordHash, Expr::value(password_hash))
            .col_expr(account::Column::ConcurrencyStamp, Expr::value(Uuid::new_v4()))
            .col_expr(account::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(account::Column::Id.eq(id))
            .filter(account::Column::ConcurrencyStamp.eq(expected_stamp))
            .exec(&self.db)
            .await
            .map_err(AppError::from)?;

        Ok(result.rows_affected == 1)
    }

    async fn ping(&self) -> AppResult<()> {
        self.db
            .execute(Statement::from_string(
                self.db.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }
}
