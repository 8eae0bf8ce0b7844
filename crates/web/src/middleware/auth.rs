//! Authentication extractors.
//!
//! The session only holds the signed-in [`AccountId`]. Each extractor
//! reloads the account, so role changes and deletions apply on the very
//! next request.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use tower_sessions::Session;

use pit_tracker_core::AccountId;

use crate::error::set_sentry_user;
use crate::models::{Account, CurrentAccount, session_keys};
use crate::services::{AccessDenied, requires_admin, requires_authenticated};
use crate::state::AppState;

/// Extractor that requires a signed-in account.
///
/// Redirects to the login page otherwise.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireAuth(account): RequireAuth) -> impl IntoResponse {
///     format!("Hello, {}!", account.username)
/// }
/// ```
pub struct RequireAuth(pub CurrentAccount);

/// Extractor that requires a signed-in admin.
///
/// Redirects to login if nobody is signed in, 403 for non-admins.
pub struct RequireAdmin(pub CurrentAccount);

/// Extractor that optionally gets the signed-in account.
pub struct OptionalAuth(pub Option<CurrentAccount>);

/// Why an auth extractor rejected the request.
#[derive(Debug)]
pub enum AuthRejection {
    /// Redirect to the login page.
    RedirectToLogin,
    /// Signed in without the required privilege.
    Forbidden,
    /// Session store or database failure.
    Internal,
}

impl From<AccessDenied> for AuthRejection {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => Self::RedirectToLogin,
            AccessDenied::Forbidden => Self::Forbidden,
        }
    }
}

impl IntoResponse for AuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/auth/login").into_response(),
            Self::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to access this page.",
            )
                .into_response(),
            Self::Internal => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error").into_response()
            }
        }
    }
}

/// Load the signed-in account for this request, if any.
///
/// A session pointing at a deleted account is flushed.
async fn load_current_account(
    parts: &Parts,
    state: &AppState,
) -> Result<Option<CurrentAccount>, AuthRejection> {
    // Set by SessionManagerLayer
    let Some(session) = parts.extensions.get::<Session>() else {
        tracing::error!("Session layer missing from router");
        return Err(AuthRejection::Internal);
    };

    let account_id: Option<AccountId> = session
        .get(session_keys::ACCOUNT_ID)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to read session");
            AuthRejection::Internal
        })?;

    let current = state
        .auth()
        .current_account(account_id)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to load session account");
            AuthRejection::Internal
        })?;

    match &current {
        Some(account) => set_sentry_user(account.id.as_i32(), &account.username),
        None if account_id.is_some() => {
            tracing::info!("Session account no longer exists, clearing session");
            if let Err(e) = session.flush().await {
                tracing::warn!(error = %e, "Failed to clear stale session");
            }
        }
        None => {}
    }

    Ok(current)
}

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = load_current_account(parts, state).await?;
        let account = requires_authenticated(current.as_ref())?;
        Ok(Self(account.clone()))
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let current = load_current_account(parts, state).await?;
        let account = requires_admin(current.as_ref()).inspect_err(|denied| {
            if *denied == AccessDenied::Forbidden {
                tracing::warn!(path = %parts.uri.path(), "Non-admin denied");
            }
        })?;
        Ok(Self(account.clone()))
    }
}

impl FromRequestParts<AppState> for OptionalAuth {
    type Rejection = AuthRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(load_current_account(parts, state).await?))
    }
}

/// Bind a freshly authenticated account to the session.
///
/// Cycles the session ID first so a pre-login session ID can't be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_account(
    session: &Session,
    account: &Account,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::ACCOUNT_ID, account.id).await
}

/// Drop everything in the session (logout). Harmless when nobody is signed in.
///
/// # Errors
///
/// Returns an error if the session store cannot be updated.
pub async fn clear_current_account(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
