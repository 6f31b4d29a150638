//! Repository implementations
//!
//! Each repository executes its unit of work inside a single database
//! transaction: header inserts, line inserts, and balance adjustments
//! commit or roll back together.

pub mod accounts;
pub mod ledger;
pub mod periods;

pub use accounts::AccountRepository;
pub use ledger::LedgerRepository;
pub use periods::PeriodRepository;

use domain_ledger::{AccountType, EntryStatus, LedgerError, TransactionKind};

pub(crate) fn account_type_to_str(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::Asset => "asset",
        AccountType::Liability => "liability",
        AccountType::Equity => "equity",
        AccountType::Revenue => "revenue",
        AccountType::Expense => "expense",
    }
}

pub(crate) fn account_type_from_str(value: &str) -> Result<AccountType, LedgerError> {
    match value {
        "asset" => Ok(AccountType::Asset),
        "liability" => Ok(AccountType::Liability),
        "equity" => Ok(AccountType::Equity),
        "revenue" => Ok(AccountType::Revenue),
        "expense" => Ok(AccountType::Expense),
        other => Err(LedgerError::Storage(format!(
            "Unknown account type in store: {}",
            other
        ))),
    }
}

pub(crate) fn kind_to_str(kind: TransactionKind) -> &'static str {
    match kind {
        TransactionKind::General => "general",
        TransactionKind::Liability => "liability",
        TransactionKind::Transfer => "transfer",
        TransactionKind::Investment => "investment",
        TransactionKind::InvestorExit => "investor_exit",
        TransactionKind::ProfitDistribution => "profit_distribution",
        TransactionKind::AssetProtection => "asset_protection",
        TransactionKind::Correction => "correction",
    }
}

pub(crate) fn kind_from_str(value: &str) -> Result<TransactionKind, LedgerError> {
    match value {
        "general" => Ok(TransactionKind::General),
        "liability" => Ok(TransactionKind::Liability),
        "transfer" => Ok(TransactionKind::Transfer),
        "investment" => Ok(TransactionKind::Investment),
        "investor_exit" => Ok(TransactionKind::InvestorExit),
        "profit_distribution" => Ok(TransactionKind::ProfitDistribution),
        "asset_protection" => Ok(TransactionKind::AssetProtection),
        "correction" => Ok(TransactionKind::Correction),
        other => Err(LedgerError::Storage(format!(
            "Unknown transaction kind in store: {}",
            other
        ))),
    }
}

pub(crate) fn status_to_str(status: EntryStatus) -> &'static str {
    match status {
        EntryStatus::Draft => "draft",
        EntryStatus::Posted => "posted",
        EntryStatus::Void => "void",
    }
}

pub(crate) fn status_from_str(value: &str) -> Result<EntryStatus, LedgerError> {
    match value {
        "draft" => Ok(EntryStatus::Draft),
        "posted" => Ok(EntryStatus::Posted),
        "void" => Ok(EntryStatus::Void),
        other => Err(LedgerError::Storage(format!(
            "Unknown entry status in store: {}",
            other
        ))),
    }
}
