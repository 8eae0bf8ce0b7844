//! Domain models for the tracker.
//!
//! These are validated domain types, separate from the database row types
//! in [`crate::db`].

pub mod account;
pub mod loan;
pub mod session;

pub use account::{Account, AccountChanges, NewAccount};
pub use loan::{LoanCounts, LoanFields, LoanRecord};
pub use session::{CurrentAccount, keys as session_keys};
