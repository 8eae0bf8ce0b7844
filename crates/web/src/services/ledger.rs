//! Tool loan ledger.
//!
//! Any signed-in account may record, edit and return loans. The acting
//! account is passed in explicitly and used for attribution in logs.

use chrono::Utc;
use thiserror::Error;

use pit_tracker_core::{FieldErrors, LoanId, LoanStatus};

use crate::db::{LoanRepository, RepositoryError};
use crate::models::{CurrentAccount, LoanCounts, LoanFields, LoanRecord};

/// Maximum team number length.
pub const MAX_TEAM_NUMBER_LENGTH: usize = 10;

/// Maximum tool name length.
pub const MAX_TOOL_NAME_LENGTH: usize = 200;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The submitted form failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// The loan does not exist.
    #[error("loan not found")]
    NotFound,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for LedgerError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => Self::NotFound,
            other => Self::Repository(other),
        }
    }
}

/// Raw loan form input.
#[derive(Debug, Clone, Default)]
pub struct LoanInput {
    pub team_number: String,
    pub tool_name: String,
    pub description: String,
}

impl LoanInput {
    /// Trim and check the form fields.
    ///
    /// # Errors
    ///
    /// Returns every field problem found.
    pub fn validate(&self) -> Result<LoanFields, FieldErrors> {
        let mut errors = FieldErrors::new();
        let team_number = self.team_number.trim();
        let tool_name = self.tool_name.trim();

        check_required(&mut errors, "team_number", team_number, MAX_TEAM_NUMBER_LENGTH);
        check_required(&mut errors, "tool_name", tool_name, MAX_TOOL_NAME_LENGTH);

        errors.into_result(LoanFields {
            team_number: team_number.to_string(),
            tool_name: tool_name.to_string(),
            description: self.description.trim().to_string(),
        })
    }
}

fn check_required(errors: &mut FieldErrors, field: &'static str, value: &str, max: usize) {
    if value.is_empty() {
        errors.add(field, "This field is required.");
    } else if value.chars().count() > max {
        errors.add(
            field,
            format!("Ensure this value has at most {max} characters."),
        );
    }
}

/// The loan list with counts taken from the same snapshot.
#[derive(Debug, Clone)]
pub struct LoanOverview {
    /// Most recently loaned first.
    pub records: Vec<LoanRecord>,
    pub counts: LoanCounts,
}

/// Tool loan ledger.
pub struct LoanLedger<'a> {
    loans: &'a dyn LoanRepository,
}

impl<'a> LoanLedger<'a> {
    /// Create a new ledger.
    #[must_use]
    pub const fn new(loans: &'a dyn LoanRepository) -> Self {
        Self { loans }
    }

    /// All loans, newest first, with total/active/returned counts.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Repository` if the query fails.
    pub async fn list_loans(&self, _actor: &CurrentAccount) -> Result<LoanOverview, LedgerError> {
        let records = self.loans.list_all().await?;
        let counts = LoanCounts::tally(&records);
        Ok(LoanOverview { records, counts })
    }

    /// Look up a single loan, for the edit form.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the loan does not exist.
    pub async fn get_loan(
        &self,
        _actor: &CurrentAccount,
        id: LoanId,
    ) -> Result<LoanRecord, LedgerError> {
        self.loans.get_by_id(id).await?.ok_or(LedgerError::NotFound)
    }

    /// Record a new loan, stamped with the current time and marked out.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` if the team number or tool name is
    /// missing or too long.
    pub async fn create_loan(
        &self,
        actor: &CurrentAccount,
        input: &LoanInput,
    ) -> Result<LoanRecord, LedgerError> {
        let fields = input.validate().map_err(LedgerError::Validation)?;
        let loan = self.loans.create(&fields, Utc::now()).await?;

        tracing::info!(
            actor = %actor.username,
            loan_id = %loan.id,
            team = %loan.team_number,
            tool = %loan.tool_name,
            "Loan recorded"
        );
        Ok(loan)
    }

    /// Change team, tool and description. Status and timestamps are untouched.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::Validation` for invalid fields and
    /// `LedgerError::NotFound` if the loan does not exist.
    pub async fn edit_loan(
        &self,
        actor: &CurrentAccount,
        id: LoanId,
        input: &LoanInput,
    ) -> Result<LoanRecord, LedgerError> {
        let fields = input.validate().map_err(LedgerError::Validation)?;
        let loan = self.loans.update_fields(id, &fields).await?;

        tracing::info!(actor = %actor.username, loan_id = %loan.id, "Loan updated");
        Ok(loan)
    }

    /// Mark a loan returned (stamping now) or back out (clearing the stamp).
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::NotFound` if the loan does not exist.
    pub async fn set_returned(
        &self,
        actor: &CurrentAccount,
        id: LoanId,
        returned: bool,
    ) -> Result<LoanRecord, LedgerError> {
        let status = LoanStatus::toggled(returned, Utc::now());
        let loan = self.loans.update_status(id, status).await?;

        tracing::info!(
            actor = %actor.username,
            loan_id = %loan.id,
            returned = loan.is_returned(),
            "Loan status changed"
        );
        Ok(loan)
    }
}
