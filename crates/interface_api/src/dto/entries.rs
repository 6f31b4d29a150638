//! Journal entry DTOs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use domain_ledger::{EntryStatus, LedgerEntry, TransactionKind};

use crate::dto::accounts::AccountResponse;

#[derive(Debug, Deserialize, Serialize)]
pub struct LegRequest {
    pub account_id: Uuid,
    #[serde(default)]
    pub debit: Decimal,
    #[serde(default)]
    pub credit: Decimal,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PostEntryRequest {
    pub company_id: Uuid,
    pub transaction_date: NaiveDate,
    #[validate(length(min = 1, max = 500))]
    pub description: String,
    #[validate(length(min = 1))]
    pub legs: Vec<LegRequest>,
    pub external_source: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct VoidEntryRequest {
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LineResponse {
    pub line_id: Uuid,
    pub account_id: Uuid,
    pub debit_amount: Decimal,
    pub credit_amount: Decimal,
    pub description: Option<String>,
}

/// A posted entry plus the refreshed balances of every touched account,
/// so the caller can render without a follow-up read
#[derive(Debug, Serialize)]
pub struct EntryResponse {
    pub transaction_id: Uuid,
    pub company_id: Uuid,
    pub period_id: Uuid,
    pub transaction_number: String,
    pub transaction_date: NaiveDate,
    pub description: String,
    pub kind: TransactionKind,
    pub total_amount: Decimal,
    pub external_source: Option<String>,
    pub status: EntryStatus,
    pub lines: Vec<LineResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub accounts: Vec<AccountResponse>,
    pub created_at: DateTime<Utc>,
}

impl EntryResponse {
    /// Builds the response from a domain entry and the touched accounts
    pub fn from_entry(entry: LedgerEntry, accounts: Vec<AccountResponse>) -> Self {
        Self {
            transaction_id: *entry.id.as_uuid(),
            company_id: *entry.company_id.as_uuid(),
            period_id: *entry.period_id.as_uuid(),
            transaction_number: entry.transaction_number,
            transaction_date: entry.date,
            description: entry.description,
            kind: entry.kind,
            total_amount: entry.total_amount.amount(),
            external_source: entry.external_source,
            status: entry.status,
            lines: entry
                .lines
                .into_iter()
                .map(|line| LineResponse {
                    line_id: *line.id.as_uuid(),
                    account_id: *line.account_id.as_uuid(),
                    debit_amount: line.debit.amount(),
                    credit_amount: line.credit.amount(),
                    description: line.description,
                })
                .collect(),
            accounts,
            created_at: entry.created_at,
        }
    }
}
