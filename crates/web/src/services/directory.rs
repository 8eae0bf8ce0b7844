//! User directory: admin-only account management.
//!
//! Every operation except [`UserDirectory::ensure_admin_seed`] takes the
//! acting account and re-checks that it is an admin before touching storage.

use thiserror::Error;

use pit_tracker_core::{AccountId, Email, FieldErrors, Role};

use super::auth::{self, AuthError};
use super::guard::{AccessDenied, requires_admin};
use crate::db::{AccountRepository, RepositoryError};
use crate::models::{Account, AccountChanges, CurrentAccount, NewAccount};

/// Maximum username length.
pub const MAX_USERNAME_LENGTH: usize = 150;

const REQUIRED: &str = "This field is required.";

/// Errors that can occur during account management.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The acting account is not an admin.
    #[error("admin privileges required")]
    Forbidden,

    /// The target account does not exist.
    #[error("account not found")]
    NotFound,

    /// An admin tried to delete their own account.
    #[error("you cannot delete your own account")]
    SelfDeletion,

    /// The submitted form failed validation.
    #[error("validation failed: {0}")]
    Validation(FieldErrors),

    /// Password hashing failed.
    #[error("password hashing error")]
    PasswordHash,

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<AccessDenied> for DirectoryError {
    fn from(_: AccessDenied) -> Self {
        Self::Forbidden
    }
}

/// Raw create-account form input.
#[derive(Debug, Clone, Default)]
pub struct NewAccountInput {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
    pub is_admin: bool,
}

/// Raw edit-account form input.
#[derive(Debug, Clone, Default)]
pub struct EditAccountInput {
    pub username: String,
    pub email: String,
    pub is_admin: bool,
}

/// Result of the bootstrap seed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeedOutcome {
    /// The admin account was created.
    Created(Account),
    /// An account with the seed email already existed; nothing changed.
    AlreadyExists(Account),
}

/// Admin-only account management.
pub struct UserDirectory<'a> {
    accounts: &'a dyn AccountRepository,
}

impl<'a> UserDirectory<'a> {
    /// Create a new user directory.
    #[must_use]
    pub const fn new(accounts: &'a dyn AccountRepository) -> Self {
        Self { accounts }
    }

    /// All accounts, sorted by username.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Forbidden` for non-admins.
    pub async fn list_accounts(
        &self,
        actor: &CurrentAccount,
    ) -> Result<Vec<Account>, DirectoryError> {
        requires_admin(Some(actor))?;
        Ok(self.accounts.list_all().await?)
    }

    /// Look up a single account, for the edit form.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Forbidden` for non-admins and
    /// `DirectoryError::NotFound` if the account does not exist.
    pub async fn get_account(
        &self,
        actor: &CurrentAccount,
        id: AccountId,
    ) -> Result<Account, DirectoryError> {
        requires_admin(Some(actor))?;
        self.accounts
            .get_by_id(id)
            .await?
            .ok_or(DirectoryError::NotFound)
    }

    /// Create an account. The single admin flag sets the [`Role`].
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Forbidden` for non-admins and
    /// `DirectoryError::Validation` if any field is invalid or the email or
    /// username is already taken. Nothing is stored on error.
    pub async fn create_account(
        &self,
        actor: &CurrentAccount,
        input: NewAccountInput,
    ) -> Result<Account, DirectoryError> {
        requires_admin(Some(actor))?;

        let mut errors = FieldErrors::new();
        let username = validate_username(&input.username, &mut errors);
        let email = validate_email(&input.email, &mut errors);

        if input.password.is_empty() {
            errors.add("password", REQUIRED);
        } else if let Err(AuthError::WeakPassword(message)) = auth::validate_password(&input.password)
        {
            errors.add("password", message);
        }
        if input.password_confirm.is_empty() {
            errors.add("password_confirm", REQUIRED);
        } else if input.password != input.password_confirm {
            errors.add("password_confirm", "The two password fields didn't match.");
        }

        let (Some(username), Some(email)) = (username, email) else {
            return Err(DirectoryError::Validation(errors));
        };
        self.check_unique(&email, &username, None, &mut errors)
            .await?;
        errors.into_result(()).map_err(DirectoryError::Validation)?;

        let account = self
            .insert(email, username, Role::from_admin_flag(input.is_admin), &input.password)
            .await?;

        tracing::info!(
            actor = %actor.username,
            account_id = %account.id,
            role = %account.role,
            "Account created"
        );
        Ok(account)
    }

    /// Change an account's username, email and role. The password is untouched.
    ///
    /// Admins may change their own role; the change applies from their next
    /// request.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Forbidden` for non-admins,
    /// `DirectoryError::NotFound` if the account does not exist and
    /// `DirectoryError::Validation` for invalid or duplicate fields.
    pub async fn edit_account(
        &self,
        actor: &CurrentAccount,
        id: AccountId,
        input: EditAccountInput,
    ) -> Result<Account, DirectoryError> {
        requires_admin(Some(actor))?;

        if self.accounts.get_by_id(id).await?.is_none() {
            return Err(DirectoryError::NotFound);
        }

        let mut errors = FieldErrors::new();
        let username = validate_username(&input.username, &mut errors);
        let email = validate_email(&input.email, &mut errors);
        let (Some(username), Some(email)) = (username, email) else {
            return Err(DirectoryError::Validation(errors));
        };
        self.check_unique(&email, &username, Some(id), &mut errors)
            .await?;
        errors.into_result(()).map_err(DirectoryError::Validation)?;

        let changes = AccountChanges {
            email,
            username,
            role: Role::from_admin_flag(input.is_admin),
        };
        let account = self
            .accounts
            .update(id, &changes)
            .await
            .map_err(conflict_to_validation)?;

        tracing::info!(
            actor = %actor.username,
            account_id = %account.id,
            role = %account.role,
            "Account updated"
        );
        Ok(account)
    }

    /// Delete an account other than the actor's own.
    ///
    /// Returns the deleted account.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Forbidden` for non-admins,
    /// `DirectoryError::SelfDeletion` if `id` is the actor (checked before
    /// any lookup or mutation) and `DirectoryError::NotFound` if the account
    /// does not exist.
    pub async fn delete_account(
        &self,
        actor: &CurrentAccount,
        id: AccountId,
    ) -> Result<Account, DirectoryError> {
        requires_admin(Some(actor))?;

        if id == actor.id {
            tracing::warn!(actor = %actor.username, "Refused self-deletion");
            return Err(DirectoryError::SelfDeletion);
        }

        let account = self
            .accounts
            .get_by_id(id)
            .await?
            .ok_or(DirectoryError::NotFound)?;
        if !self.accounts.delete(id).await? {
            return Err(DirectoryError::NotFound);
        }

        tracing::info!(
            actor = %actor.username,
            account_id = %account.id,
            "Account deleted"
        );
        Ok(account)
    }

    /// Create the bootstrap admin unless an account with `email` or
    /// `username` exists.
    ///
    /// Safe to run on every start-up, including after an admin has edited
    /// the seeded account's email. Runs outside any request, so there is no
    /// acting account.
    ///
    /// # Errors
    ///
    /// Returns `DirectoryError::Validation` if the seed identity is invalid.
    pub async fn ensure_admin_seed(
        &self,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<SeedOutcome, DirectoryError> {
        let mut errors = FieldErrors::new();
        let parsed_username = validate_username(username, &mut errors);
        let parsed_email = validate_email(email, &mut errors);
        if let Err(AuthError::WeakPassword(message)) = auth::validate_password(password) {
            errors.add("password", message);
        }
        let (Some(username), Some(email)) = (parsed_username, parsed_email) else {
            return Err(DirectoryError::Validation(errors));
        };
        errors.into_result(()).map_err(DirectoryError::Validation)?;

        if let Some(existing) = self.accounts.get_by_email(&email).await? {
            tracing::info!(account_id = %existing.id, "Admin seed already present");
            return Ok(SeedOutcome::AlreadyExists(existing));
        }
        if let Some(existing) = self.accounts.get_by_username(&username).await? {
            tracing::warn!(
                account_id = %existing.id,
                "Admin seed username taken by an account with another email, skipping"
            );
            return Ok(SeedOutcome::AlreadyExists(existing));
        }

        let account = self.insert(email, username, Role::Admin, password).await?;
        tracing::info!(account_id = %account.id, "Admin seed created");
        Ok(SeedOutcome::Created(account))
    }

    async fn insert(
        &self,
        email: Email,
        username: String,
        role: Role,
        password: &str,
    ) -> Result<Account, DirectoryError> {
        let password_hash =
            auth::hash_password(password).map_err(|_| DirectoryError::PasswordHash)?;
        self.accounts
            .create(&NewAccount {
                email,
                username,
                role,
                password_hash,
            })
            .await
            .map_err(conflict_to_validation)
    }

    async fn check_unique(
        &self,
        email: &Email,
        username: &str,
        except: Option<AccountId>,
        errors: &mut FieldErrors,
    ) -> Result<(), DirectoryError> {
        let is_other = |account: &Account| Some(account.id) != except;

        if self.accounts.get_by_email(email).await?.is_some_and(|a| is_other(&a)) {
            errors.add("email", unique_message("email"));
        }
        if self
            .accounts
            .get_by_username(username)
            .await?
            .is_some_and(|a| is_other(&a))
        {
            errors.add("username", unique_message("username"));
        }
        Ok(())
    }
}

/// A unique violation that slipped past [`UserDirectory::check_unique`]
/// (concurrent insert) still surfaces as a form error.
fn conflict_to_validation(e: RepositoryError) -> DirectoryError {
    match e {
        RepositoryError::Conflict(field) => {
            let field = if field == "username" { "username" } else { "email" };
            DirectoryError::Validation(FieldErrors::single(field, unique_message(field)))
        }
        RepositoryError::NotFound => DirectoryError::NotFound,
        other => DirectoryError::Repository(other),
    }
}

fn unique_message(field: &str) -> String {
    format!("A user with that {field} already exists.")
}

fn validate_username(raw: &str, errors: &mut FieldErrors) -> Option<String> {
    let username = raw.trim();
    if username.is_empty() {
        errors.add("username", REQUIRED);
        return None;
    }
    if username.chars().count() > MAX_USERNAME_LENGTH {
        errors.add(
            "username",
            format!("Ensure this value has at most {MAX_USERNAME_LENGTH} characters."),
        );
        return None;
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        errors.add(
            "username",
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters.",
        );
        return None;
    }
    Some(username.to_string())
}

fn validate_email(raw: &str, errors: &mut FieldErrors) -> Option<Email> {
    if raw.trim().is_empty() {
        errors.add("email", REQUIRED);
        return None;
    }
    match Email::parse(raw) {
        Ok(email) => Some(email),
        Err(_) => {
            errors.add("email", "Enter a valid email address.");
            None
        }
    }
}
