//! Transaction-strategy handlers

use axum::{extract::State, http::StatusCode, Json};
use validator::Validate;

use core_kernel::{AccountId, CompanyId, Money};

use crate::dto::entries::EntryResponse;
use crate::dto::operations::{
    AssetProtectionRequest, InvestmentRequest, InvestorExitRequest, LiabilityRequest,
    ProfitDistributionRequest, SimpleEntryRequest, TransferRequest,
};
use crate::dto::ApiEnvelope;
use crate::error::ApiError;
use crate::handlers::entry_response;
use crate::AppState;

type PostedEntry = (StatusCode, Json<ApiEnvelope<EntryResponse>>);

async fn created(state: &AppState, entry: domain_ledger::LedgerEntry, message: &str) -> Result<PostedEntry, ApiError> {
    let response = entry_response(state, entry).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok(message, response)),
    ))
}

/// Posts a single-account entry balanced against the control account
pub async fn simple_entry(
    State(state): State<AppState>,
    Json(request): Json<SimpleEntryRequest>,
) -> Result<PostedEntry, ApiError> {
    request.validate()?;
    let entry = state
        .ledger()
        .record_simple_entry(
            CompanyId::from(request.company_id),
            request.transaction_date,
            AccountId::from(request.account_id),
            request.direction,
            Money::new(request.amount, state.currency),
            &request.description,
        )
        .await?;
    created(&state, entry, "Transaction recorded").await
}

/// Creates a liability with its paired asset account
pub async fn create_liability(
    State(state): State<AppState>,
    Json(request): Json<LiabilityRequest>,
) -> Result<PostedEntry, ApiError> {
    request.validate()?;
    let entry = state
        .ledger()
        .record_liability(
            CompanyId::from(request.company_id),
            request.transaction_date,
            &request.liability_name,
            &request.liability_type,
            Money::new(request.amount, state.currency),
            request.description.as_deref(),
        )
        .await?;
    created(&state, entry, "Liability recorded").await
}

/// Transfers between two accounts
pub async fn transfer(
    State(state): State<AppState>,
    Json(request): Json<TransferRequest>,
) -> Result<PostedEntry, ApiError> {
    request.validate()?;
    let entry = state
        .ledger()
        .transfer(
            CompanyId::from(request.company_id),
            request.transaction_date,
            AccountId::from(request.from_account_id),
            AccountId::from(request.to_account_id),
            Money::new(request.amount, state.currency),
            &request.description,
        )
        .await?;
    created(&state, entry, "Transfer recorded").await
}

/// Records an external investor buy-in
pub async fn external_investment(
    State(state): State<AppState>,
    Json(request): Json<InvestmentRequest>,
) -> Result<PostedEntry, ApiError> {
    request.validate()?;
    let entry = state
        .ledger()
        .record_external_investment(
            CompanyId::from(request.company_id),
            request.transaction_date,
            AccountId::from(request.target_asset_id),
            &request.investor_name,
            request.ownership_percentage,
            Money::new(request.amount, state.currency),
        )
        .await?;
    created(&state, entry, "Investment recorded").await
}

/// Buys out an investor and retires their equity account
pub async fn investor_exit(
    State(state): State<AppState>,
    Json(request): Json<InvestorExitRequest>,
) -> Result<PostedEntry, ApiError> {
    request.validate()?;
    let entry = state
        .ledger()
        .investor_exit(
            CompanyId::from(request.company_id),
            request.transaction_date,
            AccountId::from(request.equity_account_id),
            AccountId::from(request.asset_account_id),
            Money::new(request.buyout_amount, state.currency),
        )
        .await?;
    created(&state, entry, "Investor exit recorded").await
}

/// Distributes a profit amount across investor equity accounts
pub async fn profit_distribution(
    State(state): State<AppState>,
    Json(request): Json<ProfitDistributionRequest>,
) -> Result<PostedEntry, ApiError> {
    request.validate()?;
    let entry = state
        .ledger()
        .distribute_profit(
            CompanyId::from(request.company_id),
            request.transaction_date,
            Money::new(request.total_profit, state.currency),
        )
        .await?;
    created(&state, entry, "Profit distributed").await
}

/// Draws down investor equity proportionally to shield a company asset
pub async fn asset_protection(
    State(state): State<AppState>,
    Json(request): Json<AssetProtectionRequest>,
) -> Result<PostedEntry, ApiError> {
    request.validate()?;
    let entry = state
        .ledger()
        .protect_assets(
            CompanyId::from(request.company_id),
            request.transaction_date,
            AccountId::from(request.asset_account_id),
            Money::new(request.protection_amount, state.currency),
        )
        .await?;
    created(&state, entry, "Asset protection recorded").await
}
