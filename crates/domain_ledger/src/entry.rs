//! Journal entry and line types
//!
//! This module defines the structure of financial transactions in the
//! double-entry ledger: drafts assembled by callers and strategies, and the
//! posted entries the engine persists.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use core_kernel::{AccountId, CompanyId, EntryId, LineId, Money, PeriodId};

use crate::error::LedgerError;

/// Tolerance for the double-entry balance check, in currency units
pub fn balance_tolerance() -> Decimal {
    dec!(0.01)
}

/// Side of a ledger line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Debit,
    Credit,
}

impl Side {
    /// Returns the opposite side
    pub fn opposite(&self) -> Side {
        match self {
            Side::Debit => Side::Credit,
            Side::Credit => Side::Debit,
        }
    }
}

/// Business-level classification of an entry, used for transaction numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Plain debit/credit entry
    General,
    /// Liability creation with its paired asset
    Liability,
    /// Account-to-account micro-transfer
    Transfer,
    /// External investor buy-in
    Investment,
    /// Investor buyout and stake retirement
    InvestorExit,
    /// Profit fan-out across investor equity
    ProfitDistribution,
    /// Proportional equity draw-down protecting an asset
    AssetProtection,
    /// Replacement entry posted by a correction
    Correction,
}

impl TransactionKind {
    /// Returns the transaction-number prefix for this kind
    pub fn prefix(&self) -> &'static str {
        match self {
            TransactionKind::General => "TXN",
            TransactionKind::Liability => "LIA",
            TransactionKind::Transfer => "TRF",
            TransactionKind::Investment => "INV",
            TransactionKind::InvestorExit => "EXT",
            TransactionKind::ProfitDistribution => "DST",
            TransactionKind::AssetProtection => "PRT",
            TransactionKind::Correction => "COR",
        }
    }
}

/// Lifecycle status of a ledger entry
///
/// `draft -(post)-> posted -(void)-> void`; posted entries are immutable
/// apart from voiding, and void is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Draft,
    Posted,
    Void,
}

/// A single line within an entry
///
/// Exactly one of `debit` and `credit` is nonzero.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryLine {
    /// Unique line identifier
    pub id: LineId,
    /// Account the line posts to
    pub account_id: AccountId,
    /// Debit amount (zero for credit lines)
    pub debit: Money,
    /// Credit amount (zero for debit lines)
    pub credit: Money,
    /// Optional line description
    pub description: Option<String>,
}

impl EntryLine {
    /// Creates a debit line
    pub fn debit(account_id: AccountId, amount: Money) -> Self {
        Self {
            id: LineId::new(),
            account_id,
            debit: amount,
            credit: Money::zero(amount.currency()),
            description: None,
        }
    }

    /// Creates a credit line
    pub fn credit(account_id: AccountId, amount: Money) -> Self {
        Self {
            id: LineId::new(),
            account_id,
            debit: Money::zero(amount.currency()),
            credit: amount,
            description: None,
        }
    }

    /// Adds a description to the line
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns which side this line posts to
    ///
    /// Only meaningful for a well-formed line (see [`EntryLine::is_well_formed`]).
    pub fn side(&self) -> Side {
        if self.debit.is_positive() {
            Side::Debit
        } else {
            Side::Credit
        }
    }

    /// Returns the nonzero amount of the line
    pub fn amount(&self) -> Money {
        match self.side() {
            Side::Debit => self.debit,
            Side::Credit => self.credit,
        }
    }

    /// Returns true when exactly one of debit/credit is positive
    pub fn is_well_formed(&self) -> bool {
        (self.debit.is_positive() && self.credit.is_zero())
            || (self.credit.is_positive() && self.debit.is_zero())
    }
}

/// An entry being assembled, before posting
#[derive(Debug, Clone)]
pub struct EntryDraft {
    pub company_id: CompanyId,
    pub date: NaiveDate,
    pub kind: TransactionKind,
    pub description: String,
    pub external_source: Option<String>,
    pub lines: Vec<EntryLine>,
}

impl EntryDraft {
    /// Creates a new empty draft
    pub fn new(
        company_id: CompanyId,
        date: NaiveDate,
        kind: TransactionKind,
        description: impl Into<String>,
    ) -> Self {
        Self {
            company_id,
            date,
            kind,
            description: description.into(),
            external_source: None,
            lines: Vec::new(),
        }
    }

    /// Records the external party the funds came from (e.g., an investor)
    pub fn from_source(mut self, source: impl Into<String>) -> Self {
        self.external_source = Some(source.into());
        self
    }

    /// Adds a debit line
    pub fn debit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.lines.push(EntryLine::debit(account_id, amount));
        self
    }

    /// Adds a credit line
    pub fn credit(mut self, account_id: AccountId, amount: Money) -> Self {
        self.lines.push(EntryLine::credit(account_id, amount));
        self
    }

    /// Adds a prepared line
    pub fn line(mut self, line: EntryLine) -> Self {
        self.lines.push(line);
        self
    }

    /// Sums the debit and credit sides
    pub fn totals(&self) -> (Decimal, Decimal) {
        let mut debits = Decimal::ZERO;
        let mut credits = Decimal::ZERO;

        for line in &self.lines {
            debits += line.debit.amount();
            credits += line.credit.amount();
        }

        (debits, credits)
    }

    /// Returns true if debits equal credits within the balance tolerance
    pub fn is_balanced(&self) -> bool {
        let (debits, credits) = self.totals();
        (debits - credits).abs() <= balance_tolerance()
    }

    /// Validates the draft's shape and balance
    ///
    /// Checks that lines exist, every line has exactly one positive side,
    /// and the entry balances. Account-level checks (existence, activity,
    /// company scope) are the engine's responsibility.
    pub fn validate(&self) -> Result<(), LedgerError> {
        if self.lines.is_empty() {
            return Err(LedgerError::validation("Entry has no lines"));
        }

        for line in &self.lines {
            if !line.is_well_formed() {
                return Err(LedgerError::validation(format!(
                    "Line on account {} must have exactly one of debit/credit positive",
                    line.account_id
                )));
            }
        }

        if !self.is_balanced() {
            let (debits, credits) = self.totals();
            return Err(LedgerError::Unbalanced { debits, credits });
        }

        Ok(())
    }
}

/// A persisted journal entry with its lines
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Unique entry identifier
    pub id: EntryId,
    /// Owning company
    pub company_id: CompanyId,
    /// Accounting period the entry falls in
    pub period_id: PeriodId,
    /// Business-readable number, unique per company
    pub transaction_number: String,
    /// Business date of the transaction
    pub date: NaiveDate,
    /// Description
    pub description: String,
    /// Classification
    pub kind: TransactionKind,
    /// Sum of the debit side
    pub total_amount: Money,
    /// External party, when funds came from outside the company
    pub external_source: Option<String>,
    /// Lifecycle status
    pub status: EntryStatus,
    /// Lines, owned by this entry
    pub lines: Vec<EntryLine>,
    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
}

/// Generates a transaction number: kind prefix, business date, random suffix
///
/// Uniqueness per company is enforced by the engine (and a unique index in
/// the store); the random suffix only keeps collisions rare.
pub fn transaction_number(kind: TransactionKind, date: NaiveDate) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}-{}",
        kind.prefix(),
        date.format("%Y%m%d"),
        &suffix[..6].to_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::Currency;
    use rust_decimal_macros::dec;

    fn usd(amount: Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn draft() -> EntryDraft {
        EntryDraft::new(
            CompanyId::new(),
            NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
            TransactionKind::General,
            "Test entry",
        )
    }

    #[test]
    fn test_line_sides() {
        let account = AccountId::new();
        let debit = EntryLine::debit(account, usd(dec!(100)));
        let credit = EntryLine::credit(account, usd(dec!(100)));

        assert_eq!(debit.side(), Side::Debit);
        assert_eq!(credit.side(), Side::Credit);
        assert_eq!(debit.amount(), usd(dec!(100)));
        assert!(debit.is_well_formed());
        assert!(credit.is_well_formed());
    }

    #[test]
    fn test_line_with_both_sides_is_malformed() {
        let mut line = EntryLine::debit(AccountId::new(), usd(dec!(100)));
        line.credit = usd(dec!(50));
        assert!(!line.is_well_formed());
    }

    #[test]
    fn test_line_with_neither_side_is_malformed() {
        let line = EntryLine::debit(AccountId::new(), usd(dec!(0)));
        assert!(!line.is_well_formed());
    }

    #[test]
    fn test_draft_balance_check() {
        let a = AccountId::new();
        let b = AccountId::new();

        let balanced = draft().debit(a, usd(dec!(100))).credit(b, usd(dec!(100)));
        assert!(balanced.is_balanced());
        assert!(balanced.validate().is_ok());

        let unbalanced = draft().debit(a, usd(dec!(100))).credit(b, usd(dec!(60)));
        assert!(!unbalanced.is_balanced());
        assert!(matches!(
            unbalanced.validate(),
            Err(LedgerError::Unbalanced { .. })
        ));
    }

    #[test]
    fn test_draft_balance_tolerance() {
        let a = AccountId::new();
        let b = AccountId::new();

        // One cent of rounding drift is accepted
        let near = draft()
            .debit(a, usd(dec!(100.00)))
            .credit(b, usd(dec!(99.99)));
        assert!(near.is_balanced());

        let far = draft()
            .debit(a, usd(dec!(100.00)))
            .credit(b, usd(dec!(99.98)));
        assert!(!far.is_balanced());
    }

    #[test]
    fn test_empty_draft_rejected() {
        assert!(matches!(
            draft().validate(),
            Err(LedgerError::Validation(_))
        ));
    }

    #[test]
    fn test_transaction_number_format() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let number = transaction_number(TransactionKind::Liability, date);

        assert!(number.starts_with("LIA-20240315-"));
        assert_eq!(number.len(), "LIA-20240315-".len() + 6);
    }

    #[test]
    fn test_kind_prefixes_are_distinct() {
        let kinds = [
            TransactionKind::General,
            TransactionKind::Liability,
            TransactionKind::Transfer,
            TransactionKind::Investment,
            TransactionKind::InvestorExit,
            TransactionKind::ProfitDistribution,
            TransactionKind::AssetProtection,
            TransactionKind::Correction,
        ];
        let unique: std::collections::HashSet<_> = kinds.iter().map(|k| k.prefix()).collect();
        assert_eq!(unique.len(), kinds.len());
    }
}
