use std::sync::Arc;

use crate::{
    db::AccountStore,
    error::{AppError, AppResult},
    models::{LoginRequest, RegisterRequest, RequestContext},
};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const DUPLICATE_EMAIL: &str = "Email already exists. Please use a different email.";

/// Registration and login
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    admin_email: String,
}

impl AccountService {
    pub fn new(accounts: Arc<dyn AccountStore>, admin_email: impl Into<String>) -> Self {
        Self {
            accounts,
            admin_email: admin_email.into(),
        }
    }

    /// Creates a non-admin account and returns the identity to log it in with
    pub async fn register(&self, request: RegisterRequest) -> AppResult<RequestContext> {
        let new_account = request.validate()?;

        if self
            .accounts
            .find_by_email(&new_account.email)
            .await?
            .is_some()
        {
            return Err(AppError::Validation(DUPLICATE_EMAIL.to_string()));
        }

        let account = self.accounts.insert(new_account).await?;
        tracing::info!(account_id = account.id, email = %account.email, "Account registered");

        Ok(RequestContext::for_account(&account, &self.admin_email))
    }

    pub async fn authenticate(&self, request: LoginRequest) -> AppResult<RequestContext> {
        let email = request.email.trim();
        if email.is_empty() || request.password.is_empty() {
            return Err(AppError::Validation(
                "Email and password are required".to_string(),
            ));
        }

        let account = self
            .accounts
            .find_by_email(email)
            .await?
            .filter(|account| account.password == request.password)
            .ok_or_else(|| {
                tracing::info!(email = %email, "Rejected login");
                AppError::Unauthorized(INVALID_CREDENTIALS.to_string())
            })?;

        Ok(RequestContext::for_account(&account, &self.admin_email))
    }
}
