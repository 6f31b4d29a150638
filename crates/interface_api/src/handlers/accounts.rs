//! Account handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{AccountId, CompanyId, Money};
use domain_ledger::{AccountPatch, InvestorStake, NewAccount};

use crate::dto::accounts::{
    AccountResponse, CompanyQuery, CreateAccountRequest, UpdateAccountRequest,
};
use crate::dto::ApiEnvelope;
use crate::error::ApiError;
use crate::AppState;

/// Creates an account
pub async fn create_account(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<AccountResponse>>), ApiError> {
    request.validate()?;

    let mut spec = NewAccount::new(
        CompanyId::from(request.company_id),
        request.account_name,
        request.account_type,
        Money::new(request.opening_balance, state.currency),
    );
    if request.is_contra {
        spec = spec.contra();
    }
    if let Some(description) = request.description {
        spec = spec.with_description(description);
    }
    if let (Some(name), Some(percentage)) = (request.investor_name, request.ownership_percentage) {
        spec = spec.with_investor(name, percentage);
    }
    if let Some(parent) = request.parent_account_id {
        spec = spec.child_of(AccountId::from(parent));
    }

    let account = state.accounts().create(spec).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok("Account created", account.into())),
    ))
}

/// Lists a company's accounts
pub async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<ApiEnvelope<Vec<AccountResponse>>>, ApiError> {
    let accounts = state
        .accounts()
        .list_for_company(CompanyId::from(query.company_id))
        .await?;
    let responses: Vec<AccountResponse> = accounts.into_iter().map(Into::into).collect();
    Ok(Json(ApiEnvelope::ok("Accounts retrieved", responses)))
}

/// Gets an account
pub async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<AccountResponse>>, ApiError> {
    let account = state.accounts().fetch(AccountId::from(id)).await?;
    Ok(Json(ApiEnvelope::ok("Account retrieved", account.into())))
}

/// Applies a partial update to an account
pub async fn update_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateAccountRequest>,
) -> Result<Json<ApiEnvelope<AccountResponse>>, ApiError> {
    request.validate()?;

    let investor = match (request.investor_name, request.ownership_percentage) {
        (Some(name), Some(percentage)) => Some(InvestorStake {
            investor_name: name,
            ownership_percentage: percentage,
        }),
        _ => None,
    };

    let patch = AccountPatch {
        name: request.account_name,
        code: request.account_code,
        account_type: request.account_type,
        description: request.description,
        investor,
        parent_id: request.parent_account_id.map(AccountId::from),
    };

    let account = state.accounts().update(AccountId::from(id), patch).await?;
    Ok(Json(ApiEnvelope::ok("Account updated", account.into())))
}

/// Soft-deletes an account
pub async fn delete_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<()>>, ApiError> {
    state.accounts().soft_delete(AccountId::from(id)).await?;
    Ok(Json(ApiEnvelope::ok("Account deleted", ())))
}
