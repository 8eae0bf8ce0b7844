//! Authorization predicates.
//!
//! Route extractors and services both go through these two functions, so the
//! rule for "who may do what" lives in one place.

use crate::models::CurrentAccount;

/// Why a guard refused a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum AccessDenied {
    /// Nobody is signed in.
    #[error("authentication required")]
    Unauthenticated,
    /// Signed in, but not an admin.
    #[error("you do not have permission to access this page")]
    Forbidden,
}

/// Pass if any account is signed in.
///
/// # Errors
///
/// Returns `AccessDenied::Unauthenticated` if `current` is `None`.
pub const fn requires_authenticated(
    current: Option<&CurrentAccount>,
) -> Result<&CurrentAccount, AccessDenied> {
    match current {
        Some(account) => Ok(account),
        None => Err(AccessDenied::Unauthenticated),
    }
}

/// Pass if an admin is signed in.
///
/// # Errors
///
/// Returns `AccessDenied::Unauthenticated` if nobody is signed in and
/// `AccessDenied::Forbidden` if the account is not an admin.
pub const fn requires_admin(
    current: Option<&CurrentAccount>,
) -> Result<&CurrentAccount, AccessDenied> {
    match requires_authenticated(current) {
        Ok(account) if account.is_admin() => Ok(account),
        Ok(_) => Err(AccessDenied::Forbidden),
        Err(denied) => Err(denied),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pit_tracker_core::{AccountId, Email, Role};

    use super::*;

    fn account(role: Role) -> CurrentAccount {
        CurrentAccount {
            id: AccountId::new(1),
            email: Email::parse("crew@team1234.org").unwrap(),
            username: "crew".to_string(),
            role,
        }
    }

    #[test]
    fn test_requires_authenticated() {
        assert_eq!(
            requires_authenticated(None),
            Err(AccessDenied::Unauthenticated)
        );
        let member = account(Role::Member);
        assert_eq!(requires_authenticated(Some(&member)), Ok(&member));
    }

    #[test]
    fn test_requires_admin() {
        assert_eq!(requires_admin(None), Err(AccessDenied::Unauthenticated));

        let member = account(Role::Member);
        assert_eq!(requires_admin(Some(&member)), Err(AccessDenied::Forbidden));

        let admin = account(Role::Admin);
        assert_eq!(requires_admin(Some(&admin)), Ok(&admin));
    }
}
