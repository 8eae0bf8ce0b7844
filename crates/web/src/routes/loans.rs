//! Tool loan route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::instrument;

use pit_tracker_core::{FieldErrors, LoanId};

use super::{MessageQuery, NavView, checkbox, format_timestamp, with_query};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{LoanCounts, LoanRecord};
use crate::services::{LedgerError, LoanInput};
use crate::state::AppState;

// =============================================================================
// Form Types
// =============================================================================

/// Add/edit loan form data.
#[derive(Debug, Default, Deserialize)]
pub struct LoanForm {
    #[serde(default)]
    pub team_number: String,
    #[serde(default)]
    pub tool_name: String,
    #[serde(default)]
    pub description: String,
}

impl From<LoanForm> for LoanInput {
    fn from(form: LoanForm) -> Self {
        Self {
            team_number: form.team_number,
            tool_name: form.tool_name,
            description: form.description,
        }
    }
}

/// Return-toggle form data. A present `returned` checkbox means returned.
#[derive(Debug, Deserialize)]
pub struct ReturnForm {
    pub returned: Option<String>,
}

// =============================================================================
// View Types
// =============================================================================

/// Loan row for the list page.
#[derive(Debug, Clone)]
pub struct LoanView {
    pub id: i32,
    pub team_number: String,
    pub tool_name: String,
    pub description: String,
    pub date_loaned: String,
    pub returned: bool,
    pub date_returned: Option<String>,
}

impl From<&LoanRecord> for LoanView {
    fn from(loan: &LoanRecord) -> Self {
        Self {
            id: loan.id.as_i32(),
            team_number: loan.team_number.clone(),
            tool_name: loan.tool_name.clone(),
            description: loan.description.clone(),
            date_loaned: format_timestamp(loan.date_loaned),
            returned: loan.is_returned(),
            date_returned: loan.date_returned().map(format_timestamp),
        }
    }
}

/// Loan list page template.
#[derive(Template, WebTemplate)]
#[template(path = "loans/index.html")]
pub struct LoansIndexTemplate {
    pub nav: NavView,
    pub loans: Vec<LoanView>,
    pub counts: LoanCounts,
    pub success: Option<String>,
}

/// Add/edit loan form template.
#[derive(Template, WebTemplate)]
#[template(path = "loans/form.html")]
pub struct LoanFormTemplate {
    pub nav: NavView,
    /// "Add" or "Edit".
    pub action: &'static str,
    pub form_action: String,
    pub team_number: String,
    pub tool_name: String,
    pub description: String,
    pub errors: FieldErrors,
}

impl LoanFormTemplate {
    fn add(nav: NavView, input: LoanInput, errors: FieldErrors) -> Self {
        Self {
            nav,
            action: "Add",
            form_action: "/tools/new".to_string(),
            team_number: input.team_number,
            tool_name: input.tool_name,
            description: input.description,
            errors,
        }
    }

    fn edit(nav: NavView, id: LoanId, input: LoanInput, errors: FieldErrors) -> Self {
        Self {
            nav,
            action: "Edit",
            form_action: format!("/tools/{id}/edit"),
            team_number: input.team_number,
            tool_name: input.tool_name,
            description: input.description,
            errors,
        }
    }
}

/// Flash message for a `?success=` code on the loan list.
fn success_message(code: &str) -> Option<&'static str> {
    match code {
        "created" => Some("Tool loan recorded successfully!"),
        "updated" => Some("Tool loan updated successfully!"),
        "returned" => Some("Tool returned successfully!"),
        "out" => Some("Tool marked as out successfully!"),
        _ => None,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Loan list with total/active/returned counts.
#[instrument(skip(account, state))]
pub async fn index(
    RequireAuth(account): RequireAuth,
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
) -> Result<LoansIndexTemplate, AppError> {
    let overview = state.ledger().list_loans(&account).await?;

    Ok(LoansIndexTemplate {
        nav: NavView::from(&account),
        loans: overview.records.iter().map(LoanView::from).collect(),
        counts: overview.counts,
        success: query
            .success
            .as_deref()
            .and_then(success_message)
            .map(str::to_string),
    })
}

/// Empty add-loan form.
pub async fn new_page(RequireAuth(account): RequireAuth) -> LoanFormTemplate {
    LoanFormTemplate::add(
        NavView::from(&account),
        LoanInput::default(),
        FieldErrors::new(),
    )
}

/// Record a new loan.
#[instrument(skip(account, state, form))]
pub async fn create(
    RequireAuth(account): RequireAuth,
    State(state): State<AppState>,
    Form(form): Form<LoanForm>,
) -> Result<Response, AppError> {
    let input = LoanInput::from(form);
    match state.ledger().create_loan(&account, &input).await {
        Ok(_) => Ok(Redirect::to(&with_query("/tools", &[("success", "created")])).into_response()),
        Err(LedgerError::Validation(errors)) => {
            Ok(LoanFormTemplate::add(NavView::from(&account), input, errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Edit-loan form, prefilled.
#[instrument(skip(account, state))]
pub async fn edit_page(
    RequireAuth(account): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
) -> Result<LoanFormTemplate, AppError> {
    let loan = state.ledger().get_loan(&account, id).await?;
    let input = LoanInput {
        team_number: loan.team_number,
        tool_name: loan.tool_name,
        description: loan.description,
    };
    Ok(LoanFormTemplate::edit(
        NavView::from(&account),
        id,
        input,
        FieldErrors::new(),
    ))
}

/// Update a loan's team, tool and description.
#[instrument(skip(account, state, form))]
pub async fn update(
    RequireAuth(account): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
    Form(form): Form<LoanForm>,
) -> Result<Response, AppError> {
    let input = LoanInput::from(form);
    match state.ledger().edit_loan(&account, id, &input).await {
        Ok(_) => Ok(Redirect::to(&with_query("/tools", &[("success", "updated")])).into_response()),
        Err(LedgerError::Validation(errors)) => {
            Ok(LoanFormTemplate::edit(NavView::from(&account), id, input, errors).into_response())
        }
        Err(e) => Err(e.into()),
    }
}

/// Mark a loan returned or back out.
#[instrument(skip(account, state, form))]
pub async fn toggle_return(
    RequireAuth(account): RequireAuth,
    State(state): State<AppState>,
    Path(id): Path<LoanId>,
    Form(form): Form<ReturnForm>,
) -> Result<Redirect, AppError> {
    let returned = checkbox(form.returned.as_ref());
    let loan = state.ledger().set_returned(&account, id, returned).await?;
    let code = if loan.is_returned() { "returned" } else { "out" };
    Ok(Redirect::to(&with_query("/tools", &[("success", code)])))
}
