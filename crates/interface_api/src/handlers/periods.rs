//! Accounting period handlers

use axum::{
    extract::{Path, State},
    Json,
};
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use core_kernel::PeriodId;
use domain_ledger::AccountingPeriod;

use crate::dto::ApiEnvelope;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct PeriodResponse {
    pub period_id: Uuid,
    pub company_id: Uuid,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub is_closed: bool,
}

impl From<AccountingPeriod> for PeriodResponse {
    fn from(period: AccountingPeriod) -> Self {
        Self {
            period_id: *period.id.as_uuid(),
            company_id: *period.company_id.as_uuid(),
            start_date: period.start_date,
            end_date: period.end_date,
            is_closed: period.is_closed,
        }
    }
}

/// Gets a period
pub async fn get_period(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<PeriodResponse>>, ApiError> {
    let period = state.periods().fetch(PeriodId::from(id)).await?;
    Ok(Json(ApiEnvelope::ok("Period retrieved", period.into())))
}

/// Closes a period to further postings
pub async fn close_period(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<PeriodResponse>>, ApiError> {
    let repo = state.periods();
    repo.close(PeriodId::from(id)).await?;
    let period = repo.fetch(PeriodId::from(id)).await?;
    Ok(Json(ApiEnvelope::ok("Period closed", period.into())))
}
