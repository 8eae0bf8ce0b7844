//! Tool loan domain types.

use chrono::{DateTime, Utc};

use pit_tracker_core::{LoanId, LoanStatus};

/// A tool lent to a team.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanRecord {
    /// Unique loan ID.
    pub id: LoanId,
    /// Team identifier as written on the pit sign (e.g. "1234").
    pub team_number: String,
    /// What was lent.
    pub tool_name: String,
    /// Free-text notes; empty when none were given.
    pub description: String,
    /// When the loan was recorded. Never changes.
    pub date_loaned: DateTime<Utc>,
    /// Out or returned (with the return time).
    pub status: LoanStatus,
}

impl LoanRecord {
    /// Whether the tool has come back.
    #[must_use]
    pub const fn is_returned(&self) -> bool {
        self.status.is_returned()
    }

    /// When the tool came back, if it has.
    #[must_use]
    pub const fn date_returned(&self) -> Option<DateTime<Utc>> {
        self.status.date_returned()
    }
}

/// Validated, editable loan fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanFields {
    pub team_number: String,
    pub tool_name: String,
    pub description: String,
}

/// Aggregate counts over the ledger.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoanCounts {
    pub total: usize,
    pub active: usize,
    pub returned: usize,
}

impl LoanCounts {
    /// Count a snapshot of loans. `active + returned == total` by construction.
    #[must_use]
    pub fn tally(loans: &[LoanRecord]) -> Self {
        let returned = loans.iter().filter(|loan| loan.is_returned()).count();
        Self {
            total: loans.len(),
            active: loans.len() - returned,
            returned,
        }
    }
}
