use serde::{Deserialize, Serialize};

use super::Account;

/// Identity of the caller for one request
///
/// Built once at the web boundary from the session and passed by value into
/// services that need to know who is acting.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RequestContext {
    pub account_id: i64,
    pub email: String,
    pub full_name: String,
    pub is_admin: bool,
}

impl RequestContext {
    /// Builds the context for a freshly authenticated account
    ///
    /// The configured administrator email is always an administrator.
    pub fn for_account(account: &Account, admin_email: &str) -> Self {
        Self {
            account_id: account.id,
            email: account.email.clone(),
            full_name: account.full_name.clone(),
            is_admin: account.is_admin || account.email.eq_ignore_ascii_case(admin_email),
        }
    }

    /// Whether this caller may remove content authored by `author`
    pub fn can_manage(&self, author: &str) -> bool {
        self.is_admin || self.email == author
    }
}
