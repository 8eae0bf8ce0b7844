//! Account domain types.

use chrono::{DateTime, Utc};

use pit_tracker_core::{AccountId, Email, Role};

/// A staff account that can sign in to the tracker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    /// Unique account ID.
    pub id: AccountId,
    /// Login identity.
    pub email: Email,
    /// Display name, unique across accounts.
    pub username: String,
    /// Privilege level.
    pub role: Role,
    /// When the account was created.
    pub date_joined: DateTime<Utc>,
    /// Most recent successful sign-in.
    pub last_login: Option<DateTime<Utc>>,
}

impl Account {
    /// Whether the account may manage other accounts.
    #[must_use]
    pub const fn is_admin(&self) -> bool {
        self.role.is_admin()
    }
}

/// A validated account ready to be inserted.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: Email,
    pub username: String,
    pub role: Role,
    /// Argon2 PHC string.
    pub password_hash: String,
}

/// Validated changes from the edit-account form. The password is never
/// touched by an edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountChanges {
    pub email: Email,
    pub username: String,
    pub role: Role,
}
