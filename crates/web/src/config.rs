//! Tracker configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `PIT_TRACKER_DATABASE_URL` - `PostgreSQL` connection string (falls back to
//!   `DATABASE_URL`; when neither is set the server runs with in-memory storage)
//! - `PIT_TRACKER_HOST` - Bind address (default: 127.0.0.1)
//! - `PIT_TRACKER_PORT` - Listen port (default: 3000)
//! - `PIT_TRACKER_BASE_URL` - Public URL (default: <http://localhost:3000>)
//! - `PIT_TRACKER_LOG_JSON` - Emit JSON logs when set
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)
//!
//! ## Optional (bootstrap admin, all three or none)
//! - `PIT_TRACKER_SEED_ADMIN_EMAIL`
//! - `PIT_TRACKER_SEED_ADMIN_USERNAME`
//! - `PIT_TRACKER_SEED_ADMIN_PASSWORD`

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: &str = "3000";
const DEFAULT_BASE_URL: &str = "http://localhost:3000";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Tracker application configuration.
#[derive(Clone)]
pub struct TrackerConfig {
    /// `PostgreSQL` connection URL (contains password); `None` means in-memory storage
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL, used to decide whether cookies are `Secure`
    pub base_url: String,
    /// Emit JSON-formatted logs
    pub log_json: bool,
    /// Admin account created at startup if missing
    pub seed_admin: Option<SeedAdminConfig>,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl std::fmt::Debug for TrackerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerConfig")
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[REDACTED]"),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("base_url", &self.base_url)
            .field("log_json", &self.log_json)
            .field("seed_admin", &self.seed_admin)
            .field("sentry_dsn", &self.sentry_dsn.as_ref().map(|_| "[REDACTED]"))
            .field("sentry_environment", &self.sentry_environment)
            .field("sentry_sample_rate", &self.sentry_sample_rate)
            .field("sentry_traces_sample_rate", &self.sentry_traces_sample_rate)
            .finish()
    }
}

/// Identity of the bootstrap admin account.
///
/// Implements `Debug` manually to redact the password.
#[derive(Clone)]
pub struct SeedAdminConfig {
    /// Login email of the admin
    pub email: String,
    /// Display username of the admin
    pub username: String,
    /// Initial password
    pub password: SecretString,
}

impl std::fmt::Debug for SeedAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SeedAdminConfig")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl SeedAdminConfig {
    fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Result<Option<Self>, ConfigError> {
        let email = lookup("PIT_TRACKER_SEED_ADMIN_EMAIL");
        let username = lookup("PIT_TRACKER_SEED_ADMIN_USERNAME");
        let password = lookup("PIT_TRACKER_SEED_ADMIN_PASSWORD");

        match (email, username, password) {
            (Some(email), Some(username), Some(password)) => Ok(Some(Self {
                email,
                username,
                password: SecretString::from(password),
            })),
            (None, None, None) => Ok(None),
            _ => Err(ConfigError::InvalidEnvVar(
                "PIT_TRACKER_SEED_ADMIN_*".to_string(),
                "EMAIL, USERNAME and PASSWORD must be set together".to_string(),
            )),
        }
    }
}

impl TrackerConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok().filter(|v| !v.is_empty()))
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("PIT_TRACKER_DATABASE_URL")
            .or_else(|| lookup("DATABASE_URL"))
            .map(SecretString::from);

        let host_raw = lookup("PIT_TRACKER_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let host = host_raw.parse::<IpAddr>().map_err(|e| {
            ConfigError::InvalidEnvVar("PIT_TRACKER_HOST".to_string(), e.to_string())
        })?;
        let port_raw = lookup("PIT_TRACKER_PORT").unwrap_or_else(|| DEFAULT_PORT.to_string());
        let port = port_raw.parse::<u16>().map_err(|e| {
            ConfigError::InvalidEnvVar("PIT_TRACKER_PORT".to_string(), e.to_string())
        })?;

        let base_url =
            lookup("PIT_TRACKER_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidEnvVar(
                "PIT_TRACKER_BASE_URL".to_string(),
                "must start with http:// or https://".to_string(),
            ));
        }

        let log_json = lookup("PIT_TRACKER_LOG_JSON").is_some();
        let seed_admin = SeedAdminConfig::from_lookup(&lookup)?;

        let sentry_dsn = lookup("SENTRY_DSN");
        let sentry_environment = lookup("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = lookup("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = lookup("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            log_json,
            seed_admin,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Configuration for in-process use: in-memory storage, no Sentry, no seed.
    #[must_use]
    pub fn local() -> Self {
        Self {
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: DEFAULT_BASE_URL.to_string(),
            log_json: false,
            seed_admin: None,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the public URL is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}
