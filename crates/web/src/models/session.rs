//! Session-related types for authentication.

use pit_tracker_core::{AccountId, Email, Role};

use super::account::Account;

/// The signed-in account acting on a request.
///
/// Built fresh from the database on every request; only the
/// [`AccountId`] is kept in the session itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentAccount {
    /// Account's database ID.
    pub id: AccountId,
    /// Account's email address.
    pub email: Email,
    /// Account's display name.
    pub username: String,
    /// Account's privilege level.
    pub role: Role,
}

impl CurrentAccount {
    /// Whether the acting account is an admin.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

impl From<Account> for CurrentAccount {
    fn from(account: Account) -> Self {
        Self {
            id: account.id,
            email: account.email,
            username: account.username,
            role: account.role,
        }
    }
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for the signed-in account's ID.
    pub const ACCOUNT_ID: &str = "account_id";
}
