//! Admin account commands.
//!
//! # Usage
//!
//! ```bash
//! pt-cli admin seed -e lead@team1234.org -u lead -p 'correct horse'
//!
//! # Or entirely from the environment
//! PIT_TRACKER_SEED_ADMIN_EMAIL=lead@team1234.org \
//! PIT_TRACKER_SEED_ADMIN_USERNAME=lead \
//! PIT_TRACKER_SEED_ADMIN_PASSWORD='correct horse' \
//! pt-cli admin seed
//! ```

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use pit_tracker_web::db::PgAccountRepository;
use pit_tracker_web::services::{DirectoryError, SeedOutcome, UserDirectory};

use super::{ConnectError, connect};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Could not reach the database.
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Seeding was rejected (invalid input or storage failure).
    #[error("Could not seed admin: {0}")]
    Directory(#[from] DirectoryError),
}

/// Create an admin account unless one already exists with `email`.
///
/// # Errors
///
/// Returns an error if the database is unreachable or the seed values are
/// invalid.
pub async fn seed(email: &str, username: &str, password: SecretString) -> Result<(), AdminError> {
    let pool = connect().await?;
    let accounts = PgAccountRepository::new(pool);

    let outcome = UserDirectory::new(&accounts)
        .ensure_admin_seed(email, username, password.expose_secret())
        .await?;

    match outcome {
        SeedOutcome::Created(account) => tracing::info!(
            "Admin created! ID: {}, Username: {}, Email: {}",
            account.id,
            account.username,
            account.email
        ),
        SeedOutcome::AlreadyExists(account) => tracing::info!(
            "An account with email {} already exists ({}), nothing to do",
            account.email,
            account.username
        ),
    }
    Ok(())
}
