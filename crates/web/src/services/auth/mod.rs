//! Authentication service.
//!
//! Verifies email/password sign-ins against Argon2 hashes and resolves the
//! account behind a session.

mod error;

pub use error::AuthError;

use std::sync::LazyLock;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;

use pit_tracker_core::{AccountId, Email};

use crate::db::AccountRepository;
use crate::models::{Account, CurrentAccount};

/// Minimum password length.
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Verified against when no account matches, so unknown emails cost one
/// Argon2 verification like wrong passwords do.
static DUMMY_HASH: LazyLock<Option<String>> =
    LazyLock::new(|| hash_password("pit-tracker-unknown-account").ok());

/// Authentication service.
pub struct AuthService<'a> {
    accounts: &'a dyn AccountRepository,
}

impl<'a> AuthService<'a> {
    /// Create a new authentication service.
    #[must_use]
    pub const fn new(accounts: &'a dyn AccountRepository) -> Self {
        Self { accounts }
    }

    /// Sign in with email and password.
    ///
    /// Records the sign-in time on success. The caller is responsible for
    /// binding the returned account to the session.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` if the email is malformed or
    /// unknown, or the password is wrong. The three cases are
    /// indistinguishable to the caller.
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Account, AuthError> {
        let Ok(email) = Email::parse(email) else {
            return Err(reject_unknown(password));
        };

        let Some((mut account, password_hash)) = self.accounts.get_password_hash(&email).await?
        else {
            return Err(reject_unknown(password));
        };

        verify_password(password, &password_hash)?;

        let now = Utc::now();
        self.accounts.record_login(account.id, now).await?;
        account.last_login = Some(now);

        Ok(account)
    }

    /// Resolve the account stored in a session.
    ///
    /// Returns `None` when there is no session account or it has since been
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Repository` if the lookup fails.
    pub async fn current_account(
        &self,
        session_account: Option<AccountId>,
    ) -> Result<Option<CurrentAccount>, AuthError> {
        let Some(id) = session_account else {
            return Ok(None);
        };
        let account = self.accounts.get_by_id(id).await?;
        Ok(account.map(CurrentAccount::from))
    }
}

/// Validate password meets requirements.
///
/// # Errors
///
/// Returns `AuthError::WeakPassword` describing the first rule broken.
pub fn validate_password(password: &str) -> Result<(), AuthError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(AuthError::WeakPassword(format!(
            "This password is too short. It must contain at least {MIN_PASSWORD_LENGTH} characters."
        )));
    }

    if password.chars().all(|c| c.is_ascii_digit()) {
        return Err(AuthError::WeakPassword(
            "This password is entirely numeric.".to_string(),
        ));
    }

    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Burn one verification and fail.
fn reject_unknown(password: &str) -> AuthError {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(password, hash);
    }
    AuthError::InvalidCredentials
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}
