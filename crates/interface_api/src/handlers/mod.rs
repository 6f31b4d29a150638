//! Request handlers

pub mod accounts;
pub mod entries;
pub mod health;
pub mod operations;
pub mod periods;

use std::collections::HashSet;

use domain_ledger::LedgerEntry;

use crate::dto::entries::EntryResponse;
use crate::error::ApiError;
use crate::AppState;

/// Builds an entry response carrying the refreshed balance of every
/// account the entry touched
pub(crate) async fn entry_response(
    state: &AppState,
    entry: LedgerEntry,
) -> Result<EntryResponse, ApiError> {
    let repo = state.accounts();
    let mut seen = HashSet::new();
    let mut accounts = Vec::new();
    for line in &entry.lines {
        if seen.insert(line.account_id) {
            let account = repo.fetch(line.account_id).await?;
            accounts.push(account.into());
        }
    }
    Ok(EntryResponse::from_entry(entry, accounts))
}
