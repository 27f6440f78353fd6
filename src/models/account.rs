use serde::Deserialize;

use crate::error::AppError;

/// A registered user
///
/// The password is stored and compared verbatim.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub is_admin: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewAccount {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub is_admin: bool,
}

/// Registration form
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
}

impl RegisterRequest {
    pub fn validate(self) -> Result<NewAccount, AppError> {
        let email = self.email.trim().to_string();
        let full_name = self.full_name.trim().to_string();

        if email.is_empty() || !email.contains('@') {
            return Err(AppError::Validation(
                "A valid email address is required".to_string(),
            ));
        }
        if self.password.is_empty() {
            return Err(AppError::Validation("Password is required".to_string()));
        }
        if full_name.is_empty() {
            return Err(AppError::Validation("Full name is required".to_string()));
        }

        Ok(NewAccount {
            email,
            password: self.password,
            full_name,
            is_admin: false,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}
