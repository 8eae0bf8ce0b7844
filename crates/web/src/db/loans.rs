//! Tool loan repository for `PostgreSQL`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pit_tracker_core::{LoanId, LoanStatus};

use super::{LoanRepository, RepositoryError};
use crate::models::{LoanFields, LoanRecord};

const LOAN_COLUMNS: &str =
    "id, team_number, tool_name, description, date_loaned, returned, date_returned";

/// Internal row type for `PostgreSQL` loan queries.
#[derive(Debug, sqlx::FromRow)]
struct LoanRow {
    id: i32,
    team_number: String,
    tool_name: String,
    description: String,
    date_loaned: DateTime<Utc>,
    returned: bool,
    date_returned: Option<DateTime<Utc>>,
}

impl TryFrom<LoanRow> for LoanRecord {
    type Error = RepositoryError;

    fn try_from(row: LoanRow) -> Result<Self, Self::Error> {
        let status = LoanStatus::from_columns(row.returned, row.date_returned).ok_or_else(|| {
            RepositoryError::DataCorruption(format!(
                "loan {} has returned={} but date_returned={:?}",
                row.id, row.returned, row.date_returned
            ))
        })?;

        Ok(Self {
            id: LoanId::new(row.id),
            team_number: row.team_number,
            tool_name: row.tool_name,
            description: row.description,
            date_loaned: row.date_loaned,
            status,
        })
    }
}

/// `PostgreSQL`-backed [`LoanRepository`].
#[derive(Debug, Clone)]
pub struct PgLoanRepository {
    pool: PgPool,
}

impl PgLoanRepository {
    /// Create a new loan repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LoanRepository for PgLoanRepository {
    async fn list_all(&self) -> Result<Vec<LoanRecord>, RepositoryError> {
        let rows = sqlx::query_as::<_, LoanRow>(&format!(
            "SELECT {LOAN_COLUMNS} FROM loaned_tool ORDER BY date_loaned DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get_by_id(&self, id: LoanId) -> Result<Option<LoanRecord>, RepositoryError> {
        let row = sqlx::query_as::<_, LoanRow>(&format!(
            "SELECT {LOAN_COLUMNS} FROM loaned_tool WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn create(
        &self,
        fields: &LoanFields,
        date_loaned: DateTime<Utc>,
    ) -> Result<LoanRecord, RepositoryError> {
        let row = sqlx::query_as::<_, LoanRow>(&format!(
            r"
            INSERT INTO loaned_tool (team_number, tool_name, description, date_loaned)
            VALUES ($1, $2, $3, $4)
            RETURNING {LOAN_COLUMNS}
            "
        ))
        .bind(&fields.team_number)
        .bind(&fields.tool_name)
        .bind(&fields.description)
        .bind(date_loaned)
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn update_fields(
        &self,
        id: LoanId,
        fields: &LoanFields,
    ) -> Result<LoanRecord, RepositoryError> {
        let row = sqlx::query_as::<_, LoanRow>(&format!(
            r"
            UPDATE loaned_tool
            SET team_number = $2, tool_name = $3, description = $4
            WHERE id = $1
            RETURNING {LOAN_COLUMNS}
            "
        ))
        .bind(id)
        .bind(&fields.team_number)
        .bind(&fields.tool_name)
        .bind(&fields.description)
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }

    async fn update_status(
        &self,
        id: LoanId,
        status: LoanStatus,
    ) -> Result<LoanRecord, RepositoryError> {
        let row = sqlx::query_as::<_, LoanRow>(&format!(
            r"
            UPDATE loaned_tool
            SET returned = $2, date_returned = $3
            WHERE id = $1
            RETURNING {LOAN_COLUMNS}
            "
        ))
        .bind(id)
        .bind(status.is_returned())
        .bind(status.date_returned())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or(RepositoryError::NotFound)?.try_into()
    }
}
