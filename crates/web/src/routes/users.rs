//! User management route handlers (admin only).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use pit_tracker_core::{AccountId, FieldErrors};

use super::{MessageQuery, NavView, checkbox, format_timestamp, with_query};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdmin;
use crate::models::{Account, CurrentAccount};
use crate::services::{DirectoryError, EditAccountInput, NewAccountInput};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Create-account form data.
#[derive(Default, Deserialize)]
pub struct CreateUserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirm: String,
    pub is_admin: Option<String>,
}

impl std::fmt::Debug for CreateUserForm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CreateUserForm")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("password_confirm", &"[REDACTED]")
            .field("is_admin", &self.is_admin)
            .finish()
    }
}

/// Edit-account form data.
#[derive(Debug, Default, Deserialize)]
pub struct EditUserForm {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    pub is_admin: Option<String>,
}

// =============================================================================
// View Types
// =============================================================================

/// Account row for the list page.
#[derive(Debug, Clone)]
pub struct AccountView {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub date_joined: String,
    pub last_login: Option<String>,
    /// The row is the viewer's own account (no delete button).
    pub is_self: bool,
}

impl AccountView {
    fn new(account: &Account, viewer: &CurrentAccount) -> Self {
        Self {
            id: account.id.as_i32(),
            username: account.username.clone(),
            email: account.email.to_string(),
            is_admin: account.is_admin(),
            date_joined: format_timestamp(account.date_joined),
            last_login: account.last_login.map(format_timestamp),
            is_self: account.id == viewer.id,
        }
    }
}

/// User list page template.
#[derive(Template, WebTemplate)]
#[template(path = "users/index.html")]
pub struct UsersIndexTemplate {
    pub nav: NavView,
    pub users: Vec<AccountView>,
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Create-account form template. Passwords are never echoed back.
#[derive(Template, WebTemplate)]
#[template(path = "users/create.html")]
pub struct CreateUserTemplate {
    pub nav: NavView,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub errors: FieldErrors,
}

/// Edit-account form template.
#[derive(Template, WebTemplate)]
#[template(path = "users/edit.html")]
pub struct EditUserTemplate {
    pub nav: NavView,
    pub id: i32,
    pub username: String,
    pub email: String,
    pub is_admin: bool,
    pub errors: FieldErrors,
}

/// Flash message for a `?success=` code on the user list.
fn success_message(code: &str, user: &str) -> Option<String> {
    match code {
        "created" => Some(format!("User {user} has been created successfully.")),
        "updated_admin" => Some(format!(
            "User {user} updated successfully with admin privileges!"
        )),
        "updated_member" => Some(format!(
            "User {user} updated successfully without admin privileges!"
        )),
        "deleted" => Some(format!("User {user} deleted successfully!")),
        _ => None,
    }
}

/// Flash message for an `?error=` code on the user list.
fn error_message(code: &str) -> Option<&'static str> {
    match code {
        "self_delete" => Some("You cannot delete your own account!"),
        _ => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Account list, sorted by username.
#[instrument(skip(admin, state))]
pub async fn index(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<UsersIndexTemplate, AppError> {
    let accounts = state.directory().list_accounts(&admin).await?;
    let user = query.user.as_deref().unwrap_or_default();

    Ok(UsersIndexTemplate {
        nav: NavView::from(&admin),
        users: accounts
            .iter()
            .map(|account| AccountView::new(account, &admin))
            .collect(),
        success: query
            .success
            .as_deref()
            .and_then(|code| success_message(code, user)),
        error: query
            .error
            .as_deref()
            .and_then(error_message)
            .map(str::to_string),
    })
}

/// Empty create-account form.
pub async fn new_page(RequireAdmin(admin): RequireAdmin) -> CreateUserTemplate {
    CreateUserTemplate {
        nav: NavView::from(&admin),
        username: String::new(),
        email: String::new(),
        is_admin: false,
        errors: FieldErrors::new(),
    }
}

/// Create an account.
#[instrument(skip(admin, state, form))]
pub async fn create(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Form(form): Form<CreateUserForm>,
) -> Result<Response, AppError> {
    let is_admin = checkbox(form.is_admin.as_ref());
    let input = NewAccountInput {
        username: form.username.clone(),
        email: form.email.clone(),
        password: form.password,
        password_confirm: form.password_confirm,
        is_admin,
    };

    match state.directory().create_account(&admin, input).await {
        Ok(account) => Ok(Redirect::to(&with_query(
            "/users",
            &[("success", "created"), ("user", account.username.as_str())],
        ))
        .into_response()),
        Err(DirectoryError::Validation(errors)) => Ok(CreateUserTemplate {
            nav: NavView::from(&admin),
            username: form.username,
            email: form.email,
            is_admin,
            errors,
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Edit-account form, prefilled.
#[instrument(skip(admin, state))]
pub async fn edit_page(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<EditUserTemplate, AppError> {
    let account = state.directory().get_account(&admin, id).await?;

    Ok(EditUserTemplate {
        nav: NavView::from(&admin),
        id: account.id.as_i32(),
        username: account.username,
        email: account.email.into_inner(),
        is_admin: account.role.is_admin(),
        errors: FieldErrors::new(),
    })
}

/// Update an account's username, email and admin flag.
#[instrument(skip(admin, state, form))]
pub async fn update(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
    Form(form): Form<EditUserForm>,
) -> Result<Response, AppError> {
    let is_admin = checkbox(form.is_admin.as_ref());
    let input = EditAccountInput {
        username: form.username.clone(),
        email: form.email.clone(),
        is_admin,
    };

    match state.directory().edit_account(&admin, id, input).await {
        Ok(account) => {
            let code = if account.is_admin() {
                "updated_admin"
            } else {
                "updated_member"
            };
            Ok(Redirect::to(&with_query(
                "/users",
                &[("success", code), ("user", account.username.as_str())],
            ))
            .into_response())
        }
        Err(DirectoryError::Validation(errors)) => Ok(EditUserTemplate {
            nav: NavView::from(&admin),
            id: id.as_i32(),
            username: form.username,
            email: form.email,
            is_admin,
            errors,
        }
        .into_response()),
        Err(e) => Err(e.into()),
    }
}

/// Delete an account. Deleting your own account is refused with a flash error.
#[instrument(skip(admin, state))]
pub async fn delete(
    RequireAdmin(admin): RequireAdmin,
    State(state): State<AppState>,
    Path(id): Path<AccountId>,
) -> Result<Redirect, AppError> {
    match state.directory().delete_account(&admin, id).await {
        Ok(account) => Ok(Redirect::to(&with_query(
            "/users",
            &[("success", "deleted"), ("user", account.username.as_str())],
        ))),
        Err(DirectoryError::SelfDeletion) => Ok(Redirect::to(&with_query(
            "/users",
            &[("error", "self_delete")],
        ))),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_messages() {
        assert_eq!(
            success_message("created", "pitcrew").as_deref(),
            Some("User pitcrew has been created successfully.")
        );
        assert_eq!(
            success_message("updated_admin", "pitcrew").as_deref(),
            Some("User pitcrew updated successfully with admin privileges!")
        );
        assert_eq!(
            success_message("updated_member", "pitcrew").as_deref(),
            Some("User pitcrew updated successfully without admin privileges!")
        );
        assert_eq!(success_message("bogus", "pitcrew"), None);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            error_message("self_delete"),
            Some("You cannot delete your own account!")
        );
        assert_eq!(error_message("other"), None);
    }
}
