//! Accounting period repository
//!
//! Period resolution is find-or-create: the check-then-insert race is
//! guarded by the unique (company_id, start_date, end_date) constraint,
//! with insert-on-conflict-do-nothing and a re-select on a lost race.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool};
use tracing::debug;
use uuid::Uuid;

use core_kernel::{CompanyId, PeriodId};
use domain_ledger::{AccountingPeriod, LedgerError};

use crate::error::DatabaseError;

#[derive(Debug, Clone, sqlx::FromRow)]
struct PeriodRow {
    period_id: Uuid,
    company_id: Uuid,
    start_date: NaiveDate,
    end_date: NaiveDate,
    is_closed: bool,
}

impl From<PeriodRow> for AccountingPeriod {
    fn from(row: PeriodRow) -> Self {
        AccountingPeriod {
            id: PeriodId::from(row.period_id),
            company_id: CompanyId::from(row.company_id),
            start_date: row.start_date,
            end_date: row.end_date,
            is_closed: row.is_closed,
        }
    }
}

/// Resolves the period covering a date inside the caller's transaction
///
/// Returns the period ID and its closed flag; creates a one-day period when
/// none covers the date.
pub(crate) async fn resolve_period(
    conn: &mut PgConnection,
    company_id: CompanyId,
    date: NaiveDate,
) -> Result<(PeriodId, bool), LedgerError> {
    let existing: Option<(Uuid, bool)> = sqlx::query_as(
        "SELECT period_id, is_closed FROM accounting_periods \
         WHERE company_id = $1 AND start_date <= $2 AND end_date >= $2 \
         ORDER BY start_date LIMIT 1",
    )
    .bind(company_id.as_uuid())
    .bind(date)
    .fetch_optional(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    if let Some((id, is_closed)) = existing {
        return Ok((PeriodId::from(id), is_closed));
    }

    let candidate = PeriodId::new();
    let inserted: Option<Uuid> = sqlx::query_scalar(
        "INSERT INTO accounting_periods (period_id, company_id, start_date, end_date, is_closed) \
         VALUES ($1, $2, $3, $3, FALSE) \
         ON CONFLICT (company_id, start_date, end_date) DO NOTHING \
         RETURNING period_id",
    )
    .bind(candidate.as_uuid())
    .bind(company_id.as_uuid())
    .bind(date)
    .fetch_optional(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?;

    if let Some(id) = inserted {
        debug!(period_id = %id, %date, "Created one-day accounting period");
        return Ok((PeriodId::from(id), false));
    }

    // Lost the race; the winner's row must now be visible
    let (id, is_closed): (Uuid, bool) = sqlx::query_as(
        "SELECT period_id, is_closed FROM accounting_periods \
         WHERE company_id = $1 AND start_date <= $2 AND end_date >= $2 \
         ORDER BY start_date LIMIT 1",
    )
    .bind(company_id.as_uuid())
    .bind(date)
    .fetch_optional(&mut *conn)
    .await
    .map_err(DatabaseError::from_sqlx)?
    .ok_or_else(|| {
        LedgerError::Storage("Period vanished between insert and re-select".to_string())
    })?;

    Ok((PeriodId::from(id), is_closed))
}

/// Repository for accounting periods
#[derive(Debug, Clone)]
pub struct PeriodRepository {
    pool: PgPool,
}

impl PeriodRepository {
    /// Creates a new repository over the given pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds or creates the period covering a date
    pub async fn resolve(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> Result<PeriodId, LedgerError> {
        let mut conn = self.pool.acquire().await.map_err(DatabaseError::from_sqlx)?;
        let (id, _) = resolve_period(&mut conn, company_id, date).await?;
        Ok(id)
    }

    /// Fetches a period by ID
    pub async fn fetch(&self, id: PeriodId) -> Result<AccountingPeriod, LedgerError> {
        let row: Option<PeriodRow> = sqlx::query_as(
            "SELECT period_id, company_id, start_date, end_date, is_closed \
             FROM accounting_periods WHERE period_id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(DatabaseError::from_sqlx)?;

        row.map(AccountingPeriod::from)
            .ok_or_else(|| LedgerError::not_found("Period", id))
    }

    /// Closes a period to further postings
    pub async fn close(&self, id: PeriodId) -> Result<(), LedgerError> {
        let result = sqlx::query("UPDATE accounting_periods SET is_closed = TRUE WHERE period_id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(DatabaseError::from_sqlx)?;

        if result.rows_affected() == 0 {
            return Err(LedgerError::not_found("Period", id));
        }
        Ok(())
    }
}
