//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::TrackerConfig;
use crate::db::{
    AccountRepository, InMemoryStore, LoanRepository, PgAccountRepository, PgLoanRepository,
};
use crate::services::{AuthService, LoanLedger, UserDirectory};

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and hands out the services,
/// each borrowing the configured repositories.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: TrackerConfig,
    accounts: Arc<dyn AccountRepository>,
    loans: Arc<dyn LoanRepository>,
    pool: Option<PgPool>,
}

impl AppState {
    /// State backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(config: TrackerConfig, pool: PgPool) -> Self {
        Self::from_parts(
            config,
            Arc::new(PgAccountRepository::new(pool.clone())),
            Arc::new(PgLoanRepository::new(pool.clone())),
            Some(pool),
        )
    }

    /// State backed by a fresh [`InMemoryStore`].
    #[must_use]
    pub fn in_memory(config: TrackerConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::from_parts(config, store.clone(), store, None)
    }

    /// State from explicit repositories.
    #[must_use]
    pub fn from_parts(
        config: TrackerConfig,
        accounts: Arc<dyn AccountRepository>,
        loans: Arc<dyn LoanRepository>,
        pool: Option<PgPool>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                accounts,
                loans,
                pool,
            }),
        }
    }

    /// Get a reference to the tracker configuration.
    #[must_use]
    pub fn config(&self) -> &TrackerConfig {
        &self.inner.config
    }

    /// Get the database pool, if running against `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    /// Authentication service.
    #[must_use]
    pub fn auth(&self) -> AuthService<'_> {
        AuthService::new(self.inner.accounts.as_ref())
    }

    /// Admin-only account management.
    #[must_use]
    pub fn directory(&self) -> UserDirectory<'_> {
        UserDirectory::new(self.inner.accounts.as_ref())
    }

    /// Tool loan ledger.
    #[must_use]
    pub fn ledger(&self) -> LoanLedger<'_> {
        LoanLedger::new(self.inner.loans.as_ref())
    }
}
