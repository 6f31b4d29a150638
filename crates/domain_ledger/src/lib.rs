//! Ledger Domain - Double-Entry Accounting Engine
//!
//! This crate implements the double-entry bookkeeping core for the
//! accounting system: the chart of accounts with its per-type sign
//! convention, accounting periods, the posting engine, and the higher-level
//! transaction strategies.
//!
//! # Double-Entry Principles
//!
//! Every posting creates balanced debits and credits:
//! - Debits increase asset/expense balances
//! - Credits increase liability/equity/revenue balances
//! - The sum of all debits must equal the sum of all credits
//!
//! Liability balances are stored positive as "amount owed" and paid down by
//! debits; expense balances are stored negative and climb toward zero.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{Ledger, EntryDraft, TransactionKind};
//!
//! let mut ledger = Ledger::new(Currency::USD);
//!
//! let entry = ledger.post_entry(
//!     EntryDraft::new(company, date, TransactionKind::General, "Sale")
//!         .debit(cash, amount)
//!         .credit(revenue, amount),
//! )?;
//! ```

pub mod account;
pub mod entry;
pub mod error;
pub mod ledger;
pub mod period;
pub mod strategies;

pub use account::{Account, AccountPatch, AccountType, InvestorStake, NewAccount};
pub use entry::{EntryDraft, EntryLine, EntryStatus, LedgerEntry, Side, TransactionKind};
pub use error::LedgerError;
pub use ledger::Ledger;
pub use period::AccountingPeriod;
pub use strategies::StrategyPlan;
