//! HTTP middleware and extractors.
//!
//! # Middleware Order (outermost first, as assembled in `main`)
//!
//! 1. Sentry layers (capture errors, HTTP transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Session layer (tower-sessions, `PostgreSQL` or in-memory store)
//!
//! Route guards are extractors rather than layers: [`RequireAuth`] and
//! [`RequireAdmin`].

pub mod auth;
pub mod session;

pub use auth::{
    AuthRejection, OptionalAuth, RequireAdmin, RequireAuth, clear_current_account,
    set_current_account,
};
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
