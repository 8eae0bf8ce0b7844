//! Business logic services for the tracker.
//!
//! # Services
//!
//! - `auth` - Password sign-in and Argon2 credential handling
//! - `guard` - Authentication and admin predicates
//! - `directory` - Admin-only account management and the bootstrap seed
//! - `ledger` - Tool loan records and their out/returned lifecycle
//!
//! Every directory and ledger operation takes the acting account as an
//! explicit [`CurrentAccount`](crate::models::CurrentAccount) argument.

pub mod auth;
pub mod directory;
pub mod guard;
pub mod ledger;

pub use auth::{AuthError, AuthService};
pub use directory::{DirectoryError, EditAccountInput, NewAccountInput, SeedOutcome, UserDirectory};
pub use guard::{AccessDenied, requires_admin, requires_authenticated};
pub use ledger::{LedgerError, LoanInput, LoanLedger, LoanOverview};
