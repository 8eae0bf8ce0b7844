//! CLI command implementations.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;
use sqlx::PgPool;
use thiserror::Error;

use pit_tracker_web::config::{ConfigError, TrackerConfig};
use pit_tracker_web::db;

/// Errors shared by commands that need the database.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// Environment could not be parsed.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// No database URL in the environment.
    #[error("Missing environment variable: PIT_TRACKER_DATABASE_URL (or DATABASE_URL)")]
    MissingDatabaseUrl,

    /// Database connection error.
    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Connect to the database named by the server's own configuration.
pub async fn connect() -> Result<PgPool, ConnectError> {
    let config = TrackerConfig::from_env()?;
    let database_url: SecretString = config
        .database_url
        .ok_or(ConnectError::MissingDatabaseUrl)?;

    tracing::info!("Connecting to database...");
    Ok(db::create_pool(&database_url).await?)
}
