//! Loan lifecycle state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Whether a loaned tool is still out or has come back.
///
/// The return timestamp lives inside the `Returned` variant, so a loan can
/// never be "returned" without a return time or "out" with one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LoanStatus {
    /// The team still has the tool.
    #[default]
    Out,
    /// The tool was handed back.
    Returned {
        /// When the loan was marked returned.
        at: DateTime<Utc>,
    },
}

impl LoanStatus {
    /// The status after the return checkbox has been submitted.
    ///
    /// Marking a loan returned always stamps `now`, including when it was
    /// already returned; marking it out clears the timestamp.
    #[must_use]
    pub const fn toggled(returned: bool, now: DateTime<Utc>) -> Self {
        if returned {
            Self::Returned { at: now }
        } else {
            Self::Out
        }
    }

    /// Rebuild a status from the stored column pair.
    ///
    /// Returns `None` when the pair is inconsistent.
    #[must_use]
    pub const fn from_columns(returned: bool, date_returned: Option<DateTime<Utc>>) -> Option<Self> {
        match (returned, date_returned) {
            (false, None) => Some(Self::Out),
            (true, Some(at)) => Some(Self::Returned { at }),
            _ => None,
        }
    }

    /// Whether the tool is back.
    #[must_use]
    pub const fn is_returned(&self) -> bool {
        matches!(self, Self::Returned { .. })
    }

    /// When the tool came back, if it has.
    #[must_use]
    pub const fn date_returned(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Out => None,
            Self::Returned { at } => Some(*at),
        }
    }
}
