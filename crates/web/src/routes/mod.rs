//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Liveness check
//! GET  /health/ready           - Readiness check (storage reachable)
//!
//! # Auth
//! GET  /auth/login             - Login page
//! POST /auth/login             - Authenticate
//! GET  /auth/logout            - Logout
//! POST /auth/logout            - Logout
//!
//! # Home (signed in)
//! GET  /                       - Home
//!
//! # Tool loans (signed in)
//! GET  /tools                  - Loan list with counts
//! GET  /tools/new              - Add-loan form
//! POST /tools/new              - Record loan
//! GET  /tools/{id}/edit        - Edit-loan form
//! POST /tools/{id}/edit        - Update loan
//! POST /tools/{id}/return      - Mark returned / out
//!
//! # Users (admin only)
//! GET  /users                  - Account list
//! GET  /users/new              - Create-account form
//! POST /users/new              - Create account
//! GET  /users/{id}/edit        - Edit-account form
//! POST /users/{id}/edit        - Update account
//! POST /users/{id}/delete      - Delete account (never your own)
//! ```

pub mod auth;
pub mod health;
pub mod home;
pub mod loans;
pub mod users;

use axum::{
    Router,
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::models::CurrentAccount;
use crate::state::AppState;

/// Build the application routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Auth
        .route("/auth/login", get(auth::login_page).post(auth::login))
        .route("/auth/logout", get(auth::logout).post(auth::logout))
        // Home
        .route("/", get(home::index))
        // Tool loans
        .route("/tools", get(loans::index))
        .route("/tools/new", get(loans::new_page).post(loans::create))
        .route("/tools/{id}/edit", get(loans::edit_page).post(loans::update))
        .route("/tools/{id}/return", post(loans::toggle_return))
        // Users
        .route("/users", get(users::index))
        .route("/users/new", get(users::new_page).post(users::create))
        .route("/users/{id}/edit", get(users::edit_page).post(users::update))
        .route("/users/{id}/delete", post(users::delete))
}

// =============================================================================
// Shared View Types
// =============================================================================

/// Navigation bar data for signed-in pages.
#[derive(Debug, Clone)]
pub struct NavView {
    pub username: String,
    pub is_admin: bool,
}

impl From<&CurrentAccount> for NavView {
    fn from(account: &CurrentAccount) -> Self {
        Self {
            username: account.username.clone(),
            is_admin: account.is_admin(),
        }
    }
}

/// Query parameters for flash messages after a redirect.
#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub success: Option<String>,
    pub error: Option<String>,
    /// Username the message refers to.
    pub user: Option<String>,
}

/// Build a redirect target with form-encoded query parameters.
fn with_query(path: &str, pairs: &[(&str, &str)]) -> String {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs)
        .finish();
    format!("{path}?{query}")
}

/// Timestamp as shown in list pages.
fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%b %-d, %Y %H:%M").to_string()
}

/// A submitted checkbox arrives as `Some("on")`; an unchecked one is absent.
const fn checkbox(value: Option<&String>) -> bool {
    value.is_some()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_with_query_encodes_values() {
        assert_eq!(
            with_query("/users", &[("success", "created"), ("user", "ann+bot@pit")]),
            "/users?success=created&user=ann%2Bbot%40pit"
        );
    }

    #[test]
    fn test_format_timestamp() {
        let at = Utc
            .with_ymd_and_hms(2025, 3, 7, 14, 5, 0)
            .single()
            .unwrap_or_default();
        assert_eq!(format_timestamp(at), "Mar 7, 2025 14:05");
    }

    #[test]
    fn test_checkbox() {
        assert!(checkbox(Some(&"on".to_string())));
        assert!(!checkbox(None));
    }
}
