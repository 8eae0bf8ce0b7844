//! Authentication route handlers.
//!
//! Handles email/password login and logout.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_account, set_current_account};
use crate::services::AuthError;
use crate::state::AppState;

/// Message shown for any failed sign-in.
const INVALID_CREDENTIALS: &str = "Invalid email or password.";

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for LoginForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginForm")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "auth/login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub email: String,
}

/// Display the login page. Signed-in visitors go straight home.
pub async fn login_page(OptionalAuth(current): OptionalAuth) -> Response {
    if current.is_some() {
        return Redirect::to("/").into_response();
    }
    LoginTemplate {
        error: None,
        email: String::new(),
    }
    .into_response()
}

/// Handle login form submission.
#[instrument(skip(state, session, form), fields(email = %form.email))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    match state.auth().authenticate(&form.email, &form.password).await {
        Ok(account) => {
            set_current_account(&session, &account).await?;
            tracing::info!(account_id = %account.id, "Login succeeded");
            Ok(Redirect::to("/").into_response())
        }
        Err(AuthError::InvalidCredentials) => {
            tracing::warn!("Login failed");
            Ok(LoginTemplate {
                error: Some(INVALID_CREDENTIALS.to_string()),
                email: form.email.trim().to_string(),
            }
            .into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Log out and return to the login page.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_account(&session).await?;
    Ok(Redirect::to("/auth/login"))
}
