use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Account, NewAccount},
};

const UNIQUE_VIOLATION: &str = "23505";

#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait AccountStore: Send + Sync {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>>;

    /// Inserts the account; a duplicate email is a validation error
    async fn insert(&self, account: NewAccount) -> AppResult<Account>;
}

/// PostgreSQL-backed account storage
#[derive(Clone)]
pub struct PgAccountStore {
    pool: PgPool,
}

impl PgAccountStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AccountStore for PgAccountStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<Account>> {
        let account = sqlx::query_as::<_, Account>(
            "SELECT id, email, password, full_name, is_admin FROM accounts WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn insert(&self, account: NewAccount) -> AppResult<Account> {
        sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (email, password, full_name, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, password, full_name, is_admin
            "#,
        )
        .bind(&account.email)
        .bind(&account.password)
        .bind(&account.full_name)
        .bind(account.is_admin)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .and_then(|db| db.code())
                .is_some_and(|code| code == UNIQUE_VIOLATION);

            if duplicate {
                AppError::Validation(
                    "Email already exists. Please use a different email.".to_string(),
                )
            } else {
                AppError::Database(e)
            }
        })
    }
}
