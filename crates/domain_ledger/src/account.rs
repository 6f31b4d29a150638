//! Chart of accounts types
//!
//! This module defines the account structure for double-entry bookkeeping,
//! including the per-type sign convention that maps debits and credits to
//! stored balance changes.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{AccountId, CompanyId, Money};

use crate::entry::Side;

/// Types of accounts in the chart of accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Asset accounts (debit normal balance)
    Asset,
    /// Liability accounts (credit normal balance, stored positive as amount owed)
    Liability,
    /// Equity accounts (credit normal balance)
    Equity,
    /// Revenue accounts (credit normal balance)
    Revenue,
    /// Expense accounts (debit normal balance, stored negative and paid toward zero)
    Expense,
}

impl AccountType {
    /// Returns true if this account type has a debit normal balance
    pub fn is_debit_normal(&self) -> bool {
        matches!(self, AccountType::Asset | AccountType::Expense)
    }

    /// Returns the single-letter prefix used in generated account codes
    pub fn code_prefix(&self) -> char {
        match self {
            AccountType::Asset => 'A',
            AccountType::Liability => 'L',
            AccountType::Equity => 'E',
            AccountType::Revenue => 'R',
            AccountType::Expense => 'X',
        }
    }
}

impl std::fmt::Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            AccountType::Asset => "asset",
            AccountType::Liability => "liability",
            AccountType::Equity => "equity",
            AccountType::Revenue => "revenue",
            AccountType::Expense => "expense",
        };
        write!(f, "{}", name)
    }
}

/// An investor's stake carried on an equity account
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestorStake {
    /// Display name of the investor
    pub investor_name: String,
    /// Ownership percentage (0 < p <= 100)
    pub ownership_percentage: Decimal,
}

/// An account in the chart of accounts
///
/// `current_balance` is a materialized aggregate: the opening balance plus
/// the signed sum of every posted line touching the account. It is updated
/// incrementally by the ledger engine, never recomputed from scratch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier
    pub id: AccountId,
    /// Owning company
    pub company_id: CompanyId,
    /// Account code, unique per company (e.g., "A001")
    pub code: String,
    /// Account name
    pub name: String,
    /// Account type
    pub account_type: AccountType,
    /// Whether the normal balance sign is flipped
    pub is_contra: bool,
    /// Soft-delete flag
    pub is_active: bool,
    /// Balance at account creation
    pub opening_balance: Money,
    /// Materialized running balance
    pub current_balance: Money,
    /// Description
    pub description: Option<String>,
    /// Investor stake, for equity accounts representing a buy-in
    pub investor: Option<InvestorStake>,
    /// Parent account (hierarchical charts; no cycles)
    pub parent_id: Option<AccountId>,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl Account {
    /// Computes the signed balance change a posting side causes on this account
    ///
    /// Asset and expense accounts are debit-normal: a debit raises the stored
    /// balance, a credit lowers it. Liability, equity, and revenue accounts
    /// are credit-normal. A contra account follows the opposite rule of its
    /// type.
    pub fn balance_delta(&self, side: Side, amount: Money) -> Money {
        let debit_normal = self.account_type.is_debit_normal() ^ self.is_contra;

        match (debit_normal, side) {
            (true, Side::Debit) => amount,
            (true, Side::Credit) => -amount,
            (false, Side::Debit) => -amount,
            (false, Side::Credit) => amount,
        }
    }

    /// Returns true if this is an active equity account carrying an investor
    /// stake with a positive ownership percentage
    pub fn is_investor_equity(&self) -> bool {
        self.is_active
            && self.account_type == AccountType::Equity
            && self
                .investor
                .as_ref()
                .map_or(false, |s| s.ownership_percentage > Decimal::ZERO)
    }
}

/// Specification for creating a new account
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub company_id: CompanyId,
    pub name: String,
    pub account_type: AccountType,
    pub opening_balance: Money,
    pub is_contra: bool,
    pub description: Option<String>,
    pub investor: Option<InvestorStake>,
    pub parent_id: Option<AccountId>,
}

impl NewAccount {
    /// Creates a new account specification
    pub fn new(
        company_id: CompanyId,
        name: impl Into<String>,
        account_type: AccountType,
        opening_balance: Money,
    ) -> Self {
        Self {
            company_id,
            name: name.into(),
            account_type,
            opening_balance,
            is_contra: false,
            description: None,
            investor: None,
            parent_id: None,
        }
    }

    /// Marks the account as contra (normal balance sign flipped)
    pub fn contra(mut self) -> Self {
        self.is_contra = true;
        self
    }

    /// Sets the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Tags the account with an investor stake
    pub fn with_investor(
        mut self,
        investor_name: impl Into<String>,
        ownership_percentage: Decimal,
    ) -> Self {
        self.investor = Some(InvestorStake {
            investor_name: investor_name.into(),
            ownership_percentage,
        });
        self
    }

    /// Sets the parent account
    pub fn child_of(mut self, parent_id: AccountId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Validates the fields that need no registry lookups
    pub fn validate(&self) -> Result<(), crate::error::LedgerError> {
        use crate::error::LedgerError;

        if self.name.trim().is_empty() {
            return Err(LedgerError::validation("Account name must not be empty"));
        }
        if let Some(stake) = &self.investor {
            if stake.ownership_percentage <= Decimal::ZERO
                || stake.ownership_percentage > Decimal::ONE_HUNDRED
            {
                return Err(LedgerError::validation(format!(
                    "Ownership percentage must be in (0, 100], got {}",
                    stake.ownership_percentage
                )));
            }
        }
        Ok(())
    }
}

/// Partial update for an existing account
#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub code: Option<String>,
    pub account_type: Option<AccountType>,
    pub description: Option<String>,
    pub investor: Option<InvestorStake>,
    pub parent_id: Option<AccountId>,
}

/// Applies the registry's opening-balance convention for an account type
///
/// Expense balances are stored negative and paid toward zero, so a positive
/// opening amount on an expense account is negated. Everything else is
/// stored as given.
pub fn normalize_opening_balance(account_type: AccountType, opening: Money) -> Money {
    if account_type == AccountType::Expense && opening.is_positive() {
        -opening
    } else {
        opening
    }
}

/// Computes the next sequential account code for a type prefix
///
/// Scans the existing codes (active and inactive alike, so suffixes are
/// never reused after a soft delete), takes the highest numeric suffix for
/// the prefix, and returns prefix + suffix+1 zero-padded to three digits.
pub fn next_account_code<'a>(
    prefix: char,
    existing_codes: impl Iterator<Item = &'a str>,
) -> String {
    let max_suffix = existing_codes
        .filter_map(|code| {
            let mut chars = code.chars();
            if chars.next() == Some(prefix) {
                chars.as_str().parse::<u32>().ok()
            } else {
                None
            }
        })
        .max()
        .unwrap_or(0);

    format!("{}{:03}", prefix, max_suffix + 1)
}
