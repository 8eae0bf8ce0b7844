//! Persistence for accounts and tool loans.
//!
//! # Tables
//!
//! - `account` - Staff accounts (login identity, role, Argon2 hash)
//! - `loaned_tool` - Tool loans with their out/returned state
//! - `tower_sessions.session` - Session storage (owned by `tower-sessions-sqlx-store`)
//!
//! Services talk to storage through the [`AccountRepository`] and
//! [`LoanRepository`] traits. [`PgAccountRepository`] and
//! [`PgLoanRepository`] back them with `PostgreSQL`; [`InMemoryStore`]
//! implements both for tests and database-less runs.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/web/migrations/` and run via:
//! ```bash
//! cargo run -p pit-tracker-cli -- migrate
//! ```

pub mod accounts;
pub mod loans;
pub mod memory;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use pit_tracker_core::{AccountId, Email, LoanId, LoanStatus};

use crate::models::{Account, AccountChanges, LoanFields, LoanRecord, NewAccount};

pub use accounts::PgAccountRepository;
pub use loans::PgLoanRepository;
pub use memory::InMemoryStore;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Unique constraint violation. Carries the offending column name.
    #[error("constraint violation: {0} already exists")]
    Conflict(&'static str),
}

/// Storage for staff accounts.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// All accounts, ordered by username ascending.
    async fn list_all(&self) -> Result<Vec<Account>, RepositoryError>;

    /// Look up an account by ID.
    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError>;

    /// Look up an account by login email.
    async fn get_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError>;

    /// Look up an account by username.
    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, RepositoryError>;

    /// Look up an account together with its password hash.
    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError>;

    /// Insert a new account.
    ///
    /// Fails with [`RepositoryError::Conflict`] if the email or username is taken.
    async fn create(&self, account: &NewAccount) -> Result<Account, RepositoryError>;

    /// Overwrite an account's email, username and role.
    ///
    /// Fails with [`RepositoryError::NotFound`] or [`RepositoryError::Conflict`].
    async fn update(
        &self,
        id: AccountId,
        changes: &AccountChanges,
    ) -> Result<Account, RepositoryError>;

    /// Delete an account. Returns `false` if it did not exist.
    async fn delete(&self, id: AccountId) -> Result<bool, RepositoryError>;

    /// Stamp a successful sign-in.
    async fn record_login(&self, id: AccountId, at: DateTime<Utc>) -> Result<(), RepositoryError>;
}

/// Storage for tool loans.
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// All loans, most recently loaned first.
    async fn list_all(&self) -> Result<Vec<LoanRecord>, RepositoryError>;

    /// Look up a loan by ID.
    async fn get_by_id(&self, id: LoanId) -> Result<Option<LoanRecord>, RepositoryError>;

    /// Insert a new loan in the `Out` state.
    async fn create(
        &self,
        fields: &LoanFields,
        date_loaned: DateTime<Utc>,
    ) -> Result<LoanRecord, RepositoryError>;

    /// Overwrite team, tool and description. Leaves the status alone.
    async fn update_fields(
        &self,
        id: LoanId,
        fields: &LoanFields,
    ) -> Result<LoanRecord, RepositoryError>;

    /// Overwrite the out/returned status.
    async fn update_status(
        &self,
        id: LoanId,
        status: LoanStatus,
    ) -> Result<LoanRecord, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Map a unique violation to [`RepositoryError::Conflict`] using the
/// constraint name, leaving every other error as a database error.
pub(crate) fn map_unique_violation(
    e: sqlx::Error,
    constraints: &[(&str, &'static str)],
) -> RepositoryError {
    if let sqlx::Error::Database(ref db_err) = e
        && db_err.is_unique_violation()
    {
        let field = db_err
            .constraint()
            .and_then(|name| {
                constraints
                    .iter()
                    .find(|(constraint, _)| *constraint == name)
                    .map(|(_, field)| *field)
            })
            .unwrap_or("value");
        return RepositoryError::Conflict(field);
    }
    RepositoryError::Database(e)
}
