//! Journal entry handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use core_kernel::{AccountId, CompanyId, EntryId, LineId, Money};
use domain_ledger::{EntryDraft, EntryLine, TransactionKind};

use crate::dto::accounts::CompanyQuery;
use crate::dto::entries::{EntryResponse, PostEntryRequest, VoidEntryRequest};
use crate::dto::ApiEnvelope;
use crate::error::ApiError;
use crate::handlers::entry_response;
use crate::AppState;

fn build_draft(state: &AppState, kind: TransactionKind, request: PostEntryRequest) -> EntryDraft {
    let mut draft = EntryDraft::new(
        CompanyId::from(request.company_id),
        request.transaction_date,
        kind,
        request.description,
    );
    draft.external_source = request.external_source;
    for leg in request.legs {
        draft.lines.push(EntryLine {
            id: LineId::new(),
            account_id: AccountId::from(leg.account_id),
            debit: Money::new(leg.debit, state.currency),
            credit: Money::new(leg.credit, state.currency),
            description: leg.description,
        });
    }
    draft
}

/// Posts a balanced journal entry
pub async fn post_entry(
    State(state): State<AppState>,
    Json(request): Json<PostEntryRequest>,
) -> Result<(StatusCode, Json<ApiEnvelope<EntryResponse>>), ApiError> {
    request.validate()?;

    let draft = build_draft(&state, TransactionKind::General, request);
    let entry = state.ledger().post_entry(draft).await?;
    let response = entry_response(&state, entry).await?;
    Ok((
        StatusCode::CREATED,
        Json(ApiEnvelope::ok("Transaction posted", response)),
    ))
}

/// Lists a company's entries
pub async fn list_entries(
    State(state): State<AppState>,
    Query(query): Query<CompanyQuery>,
) -> Result<Json<ApiEnvelope<Vec<EntryResponse>>>, ApiError> {
    let entries = state
        .ledger()
        .entries_for_company(CompanyId::from(query.company_id))
        .await?;
    let responses: Vec<EntryResponse> = entries
        .into_iter()
        .map(|entry| EntryResponse::from_entry(entry, Vec::new()))
        .collect();
    Ok(Json(ApiEnvelope::ok("Transactions retrieved", responses)))
}

/// Gets an entry with its lines and account balances
pub async fn get_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiEnvelope<EntryResponse>>, ApiError> {
    let entry = state.ledger().fetch_entry(EntryId::from(id)).await?;
    let response = entry_response(&state, entry).await?;
    Ok(Json(ApiEnvelope::ok("Transaction retrieved", response)))
}

/// Voids a posted entry, reversing its balance effect
pub async fn void_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<VoidEntryRequest>,
) -> Result<Json<ApiEnvelope<EntryResponse>>, ApiError> {
    let reason = request.reason.unwrap_or_else(|| "voided".to_string());
    let entry = state.ledger().void_entry(EntryId::from(id), &reason).await?;
    let response = entry_response(&state, entry).await?;
    Ok(Json(ApiEnvelope::ok("Transaction voided", response)))
}

/// Corrects a posted entry: void + re-post as one unit
pub async fn correct_entry(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<PostEntryRequest>,
) -> Result<Json<ApiEnvelope<EntryResponse>>, ApiError> {
    request.validate()?;

    let draft = build_draft(&state, TransactionKind::Correction, request);
    let entry = state.ledger().correct_entry(EntryId::from(id), draft).await?;
    let response = entry_response(&state, entry).await?;
    Ok(Json(ApiEnvelope::ok("Transaction corrected", response)))
}
