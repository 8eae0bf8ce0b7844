//! In-memory storage used by tests and by database-less runs.
//!
//! Mirrors the `PostgreSQL` schema's rules: unique email and username,
//! accounts ordered by username, loans ordered newest first.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use pit_tracker_core::{AccountId, Email, LoanId, LoanStatus};

use super::{AccountRepository, LoanRepository, RepositoryError};
use crate::models::{Account, AccountChanges, LoanFields, LoanRecord, NewAccount};

#[derive(Debug)]
struct StoredAccount {
    account: Account,
    password_hash: String,
}

#[derive(Debug, Default)]
struct Tables {
    accounts: BTreeMap<AccountId, StoredAccount>,
    loans: BTreeMap<LoanId, LoanRecord>,
    last_account_id: i32,
    last_loan_id: i32,
}

impl Tables {
    fn conflicting_field(
        &self,
        email: &Email,
        username: &str,
        except: Option<AccountId>,
    ) -> Option<&'static str> {
        let others = self
            .accounts
            .values()
            .map(|stored| &stored.account)
            .filter(|account| Some(account.id) != except);

        for account in others {
            if account.email == *email {
                return Some("email");
            }
            if account.username == username {
                return Some("username");
            }
        }
        None
    }
}

/// Thread-safe in-memory implementation of both repositories.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountRepository for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<Account>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut accounts: Vec<Account> = tables
            .accounts
            .values()
            .map(|stored| stored.account.clone())
            .collect();
        // Byte order, same as `COLLATE "C"` in `PgAccountRepository`
        accounts.sort_by(|a, b| a.username.cmp(&b.username).then(a.id.cmp(&b.id)));
        Ok(accounts)
    }

    async fn get_by_id(&self, id: AccountId) -> Result<Option<Account>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.accounts.get(&id).map(|stored| stored.account.clone()))
    }

    async fn get_by_email(&self, email: &Email) -> Result<Option<Account>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|stored| stored.account.email == *email)
            .map(|stored| stored.account.clone()))
    }

    async fn get_by_username(&self, username: &str) -> Result<Option<Account>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|stored| stored.account.username == username)
            .map(|stored| stored.account.clone()))
    }

    async fn get_password_hash(
        &self,
        email: &Email,
    ) -> Result<Option<(Account, String)>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables
            .accounts
            .values()
            .find(|stored| stored.account.email == *email)
            .map(|stored| (stored.account.clone(), stored.password_hash.clone())))
    }

    async fn create(&self, account: &NewAccount) -> Result<Account, RepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(field) = tables.conflicting_field(&account.email, &account.username, None) {
            return Err(RepositoryError::Conflict(field));
        }

        tables.last_account_id += 1;
        let created = Account {
            id: AccountId::new(tables.last_account_id),
            email: account.email.clone(),
            username: account.username.clone(),
            role: account.role,
            date_joined: Utc::now(),
            last_login: None,
        };
        tables.accounts.insert(
            created.id,
            StoredAccount {
                account: created.clone(),
                password_hash: account.password_hash.clone(),
            },
        );
        Ok(created)
    }

    async fn update(
        &self,
        id: AccountId,
        changes: &AccountChanges,
    ) -> Result<Account, RepositoryError> {
        let mut tables = self.tables.write().await;
        if !tables.accounts.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        if let Some(field) = tables.conflicting_field(&changes.email, &changes.username, Some(id))
        {
            return Err(RepositoryError::Conflict(field));
        }

        let stored = tables
            .accounts
            .get_mut(&id)
            .ok_or(RepositoryError::NotFound)?;
        stored.account.email = changes.email.clone();
        stored.account.username.clone_from(&changes.username);
        stored.account.role = changes.role;
        Ok(stored.account.clone())
    }

    async fn delete(&self, id: AccountId) -> Result<bool, RepositoryError> {
        let mut tables = self.tables.write().await;
        Ok(tables.accounts.remove(&id).is_some())
    }

    async fn record_login(&self, id: AccountId, at: DateTime<Utc>) -> Result<(), RepositoryError> {
        let mut tables = self.tables.write().await;
        if let Some(stored) = tables.accounts.get_mut(&id) {
            stored.account.last_login = Some(at);
        }
        Ok(())
    }
}

#[async_trait]
impl LoanRepository for InMemoryStore {
    async fn list_all(&self) -> Result<Vec<LoanRecord>, RepositoryError> {
        let tables = self.tables.read().await;
        let mut loans: Vec<LoanRecord> = tables.loans.values().cloned().collect();
        loans.sort_by(|a, b| {
            b.date_loaned
                .cmp(&a.date_loaned)
                .then(b.id.cmp(&a.id))
        });
        Ok(loans)
    }

    async fn get_by_id(&self, id: LoanId) -> Result<Option<LoanRecord>, RepositoryError> {
        let tables = self.tables.read().await;
        Ok(tables.loans.get(&id).cloned())
    }

    async fn create(
        &self,
        fields: &LoanFields,
        date_loaned: DateTime<Utc>,
    ) -> Result<LoanRecord, RepositoryError> {
        let mut tables = self.tables.write().await;
        tables.last_loan_id += 1;
        let loan = LoanRecord {
            id: LoanId::new(tables.last_loan_id),
            team_number: fields.team_number.clone(),
            tool_name: fields.tool_name.clone(),
            description: fields.description.clone(),
            date_loaned,
            status: LoanStatus::Out,
        };
        tables.loans.insert(loan.id, loan.clone());
        Ok(loan)
    }

    async fn update_fields(
        &self,
        id: LoanId,
        fields: &LoanFields,
    ) -> Result<LoanRecord, RepositoryError> {
        let mut tables = self.tables.write().await;
        let loan = tables.loans.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        loan.team_number.clone_from(&fields.team_number);
        loan.tool_name.clone_from(&fields.tool_name);
        loan.description.clone_from(&fields.description);
        Ok(loan.clone())
    }

    async fn update_status(
        &self,
        id: LoanId,
        status: LoanStatus,
    ) -> Result<LoanRecord, RepositoryError> {
        let mut tables = self.tables.write().await;
        let loan = tables.loans.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        loan.status = status;
        Ok(loan.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use pit_tracker_core::Role;

    use super::*;

    fn new_account(email: &str, username: &str) -> NewAccount {
        NewAccount {
            email: Email::parse(email).unwrap(),
            username: username.to_string(),
            role: Role::Member,
            password_hash: "hash".to_string(),
        }
    }

    fn fields(tool: &str) -> LoanFields {
        LoanFields {
            team_number: "1234".to_string(),
            tool_name: tool.to_string(),
            description: String::new(),
        }
    }

    #[tokio::test]
    async fn test_accounts_sorted_by_username() {
        let store = InMemoryStore::new();
        AccountRepository::create(&store, &new_account("z@pit.org", "zed")).await.unwrap();
        AccountRepository::create(&store, &new_account("a@pit.org", "amy")).await.unwrap();
        AccountRepository::create(&store, &new_account("m@pit.org", "max")).await.unwrap();

        let names: Vec<String> = AccountRepository::list_all(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.username)
            .collect();
        assert_eq!(names, ["amy", "max", "zed"]);
    }

    #[tokio::test]
    async fn test_username_order_is_bytewise() {
        let store = InMemoryStore::new();
        for (email, username) in [("a@pit.org", "abe"), ("z@pit.org", "Zed"), ("b@pit.org", "Bea")] {
            AccountRepository::create(&store, &new_account(email, username))
                .await
                .unwrap();
        }

        let names: Vec<String> = AccountRepository::list_all(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.username)
            .collect();
        assert_eq!(names, ["Bea", "Zed", "abe"]);
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_email_and_username() {
        let store = InMemoryStore::new();
        AccountRepository::create(&store, &new_account("a@pit.org", "amy")).await.unwrap();

        let err = AccountRepository::create(&store, &new_account("a@pit.org", "other"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict("email")));

        let err = AccountRepository::create(&store, &new_account("b@pit.org", "amy"))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict("username")));

        assert_eq!(AccountRepository::list_all(&store).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_allows_keeping_own_email() {
        let store = InMemoryStore::new();
        let amy = AccountRepository::create(&store, &new_account("a@pit.org", "amy"))
            .await
            .unwrap();

        let updated = store
            .update(
                amy.id,
                &AccountChanges {
                    email: amy.email.clone(),
                    username: "amelia".to_string(),
                    role: Role::Admin,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.username, "amelia");
        assert!(updated.is_admin());
    }

    #[tokio::test]
    async fn test_update_missing_account() {
        let store = InMemoryStore::new();
        let err = store
            .update(
                AccountId::new(99),
                &AccountChanges {
                    email: Email::parse("a@pit.org").unwrap(),
                    username: "amy".to_string(),
                    role: Role::Member,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_loans_newest_first() {
        let store = InMemoryStore::new();
        let now = Utc::now();
        LoanRepository::create(&store, &fields("old"), now - Duration::hours(2))
            .await
            .unwrap();
        LoanRepository::create(&store, &fields("new"), now).await.unwrap();
        LoanRepository::create(&store, &fields("mid"), now - Duration::hours(1))
            .await
            .unwrap();

        let tools: Vec<String> = LoanRepository::list_all(&store)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.tool_name)
            .collect();
        assert_eq!(tools, ["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_update_status_missing_loan() {
        let store = InMemoryStore::new();
        let err = store
            .update_status(LoanId::new(1), LoanStatus::Out)
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }
}
