//! Session middleware configuration.
//!
//! The layer is generic over the store so the server can use
//! `PostgresStore` while tests and database-less runs use `MemoryStore`.

use tower_sessions::{Expiry, SessionManagerLayer, SessionStore};

use crate::config::TrackerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "pt_session";

/// Session expiry time in seconds (12 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the session layer over `store`.
///
/// Cookies are `Secure` only when the configured base URL is HTTPS.
#[must_use]
pub fn create_session_layer<S>(store: S, config: &TrackerConfig) -> SessionManagerLayer<S>
where
    S: SessionStore + Clone,
{
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
