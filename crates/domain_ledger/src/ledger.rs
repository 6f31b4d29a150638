//! Double-entry ledger engine
//!
//! The engine owns the chart of accounts, the accounting periods, and the
//! journal for every company in the book. It enforces the double-entry
//! rules on posting, applies the per-type sign convention to materialized
//! balances, and implements the strict mutation discipline: posted entries
//! are immutable; corrections go through void + re-post.
//!
//! # Invariants
//!
//! - Every posted entry balances to zero within the tolerance
//! - `current_balance` equals opening balance plus the signed sum of all
//!   posted (non-void) lines touching the account
//! - Voiding applies the exact inverse of the original balance deltas

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use tracing::{debug, info};

use core_kernel::{AccountId, CompanyId, Currency, EntryId, Money, PeriodId};

use crate::account::{next_account_code, Account, AccountPatch, NewAccount};
use crate::entry::{transaction_number, EntryDraft, EntryStatus, LedgerEntry};
use crate::error::LedgerError;
use crate::period::AccountingPeriod;

/// The ledger engine: chart of accounts, periods, and journal
#[derive(Debug)]
pub struct Ledger {
    /// Chart of accounts, all companies
    accounts: HashMap<AccountId, Account>,
    /// Accounting periods, all companies
    periods: Vec<AccountingPeriod>,
    /// Journal, in posting order
    entries: Vec<LedgerEntry>,
    /// Book currency
    currency: Currency,
}

impl Ledger {
    /// Creates an empty ledger in the given currency
    pub fn new(currency: Currency) -> Self {
        Self {
            accounts: HashMap::new(),
            periods: Vec::new(),
            entries: Vec::new(),
            currency,
        }
    }

    /// Returns the book currency
    pub fn currency(&self) -> Currency {
        self.currency
    }

    // ------------------------------------------------------------------
    // Account registry
    // ------------------------------------------------------------------

    /// Creates an account with a generated code
    ///
    /// The code is the type's prefix letter plus the next sequential number
    /// for that prefix within the company, zero-padded to three digits.
    /// A positive opening balance on an expense account is stored negated,
    /// so the balance climbs toward zero as spending is booked.
    ///
    /// # Errors
    ///
    /// - `Validation` on an empty name, a foreign-currency opening balance,
    ///   or an out-of-range ownership percentage
    /// - `NotFound` when the parent account does not exist
    pub fn create_account(&mut self, spec: NewAccount) -> Result<Account, LedgerError> {
        spec.validate()?;
        if spec.opening_balance.currency() != self.currency {
            return Err(LedgerError::validation(format!(
                "Opening balance currency {} does not match ledger currency {}",
                spec.opening_balance.currency(),
                self.currency
            )));
        }
        if let Some(parent_id) = spec.parent_id {
            let parent = self.account(parent_id)?;
            if parent.company_id != spec.company_id {
                return Err(LedgerError::validation(
                    "Parent account belongs to a different company",
                ));
            }
        }

        let code = next_account_code(
            spec.account_type.code_prefix(),
            self.accounts
                .values()
                .filter(|a| a.company_id == spec.company_id)
                .map(|a| a.code.as_str()),
        );

        let opening =
            crate::account::normalize_opening_balance(spec.account_type, spec.opening_balance);

        let account = Account {
            id: AccountId::new(),
            company_id: spec.company_id,
            code: code.clone(),
            name: spec.name,
            account_type: spec.account_type,
            is_contra: spec.is_contra,
            is_active: true,
            opening_balance: opening,
            current_balance: opening,
            description: spec.description,
            investor: spec.investor,
            parent_id: spec.parent_id,
            created_at: Utc::now(),
        };

        info!(account_id = %account.id, %code, account_type = %account.account_type, "Account created");

        let id = account.id;
        self.accounts.insert(id, account.clone());
        Ok(account)
    }

    /// Gets an account by ID, active or not
    pub fn account(&self, id: AccountId) -> Result<&Account, LedgerError> {
        self.accounts
            .get(&id)
            .ok_or_else(|| LedgerError::not_found("Account", id))
    }

    /// Gets an account that must be active
    pub fn active_account(&self, id: AccountId) -> Result<&Account, LedgerError> {
        let account = self.account(id)?;
        if !account.is_active {
            return Err(LedgerError::not_found("Account", id));
        }
        Ok(account)
    }

    /// Lists a company's accounts, active first, ordered by code
    pub fn accounts_for_company(&self, company_id: CompanyId) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self
            .accounts
            .values()
            .filter(|a| a.company_id == company_id)
            .collect();
        accounts.sort_by(|a, b| b.is_active.cmp(&a.is_active).then(a.code.cmp(&b.code)));
        accounts
    }

    /// Lists a company's active investor equity accounts
    pub fn investor_equity_accounts(&self, company_id: CompanyId) -> Vec<&Account> {
        let mut accounts: Vec<&Account> = self
            .accounts
            .values()
            .filter(|a| a.company_id == company_id && a.is_investor_equity())
            .collect();
        accounts.sort_by(|a, b| a.code.cmp(&b.code));
        accounts
    }

    /// Finds an active account by type and name within a company
    pub fn find_account_by_name(
        &self,
        company_id: CompanyId,
        account_type: crate::account::AccountType,
        name: &str,
    ) -> Option<&Account> {
        self.accounts.values().find(|a| {
            a.company_id == company_id
                && a.is_active
                && a.account_type == account_type
                && a.name == name
        })
    }

    /// Applies a partial update to an account
    ///
    /// # Errors
    ///
    /// - `NotFound` when the account does not exist
    /// - `Conflict` when a changed code collides within the company
    /// - `InvalidState` when changing the type of an account with lines
    /// - `Validation` on parent cycles or cross-company parents
    pub fn update_account(
        &mut self,
        id: AccountId,
        patch: AccountPatch,
    ) -> Result<Account, LedgerError> {
        let account = self
            .accounts
            .get(&id)
            .ok_or_else(|| LedgerError::not_found("Account", id))?;
        let company_id = account.company_id;

        if let Some(code) = &patch.code {
            let taken = self
                .accounts
                .values()
                .any(|a| a.company_id == company_id && a.id != id && &a.code == code);
            if taken {
                return Err(LedgerError::conflict(format!(
                    "Account code {} already exists",
                    code
                )));
            }
        }

        if let Some(new_type) = patch.account_type {
            if new_type != self.accounts[&id].account_type && self.account_has_lines(id) {
                return Err(LedgerError::invalid_state(
                    "Cannot change the type of an account with ledger lines",
                ));
            }
        }

        if let Some(parent_id) = patch.parent_id {
            let parent = self
                .accounts
                .get(&parent_id)
                .ok_or_else(|| LedgerError::not_found("Account", parent_id))?;
            if parent.company_id != company_id {
                return Err(LedgerError::validation(
                    "Parent account belongs to a different company",
                ));
            }
            // Walk the ancestor chain; the account must not become its own ancestor
            let mut cursor = Some(parent_id);
            while let Some(ancestor_id) = cursor {
                if ancestor_id == id {
                    return Err(LedgerError::validation(
                        "Parent change would create a cycle in the account tree",
                    ));
                }
                cursor = self.accounts.get(&ancestor_id).and_then(|a| a.parent_id);
            }
        }

        let account = self.accounts.get_mut(&id).expect("account checked above");
        if let Some(name) = patch.name {
            if name.trim().is_empty() {
                return Err(LedgerError::validation("Account name must not be empty"));
            }
            account.name = name;
        }
        if let Some(code) = patch.code {
            account.code = code;
        }
        if let Some(new_type) = patch.account_type {
            account.account_type = new_type;
        }
        if let Some(description) = patch.description {
            account.description = Some(description);
        }
        if let Some(investor) = patch.investor {
            account.investor = Some(investor);
        }
        if let Some(parent_id) = patch.parent_id {
            account.parent_id = Some(parent_id);
        }

        Ok(account.clone())
    }

    /// Atomically adds a signed delta to an account's materialized balance
    pub fn adjust_balance(&mut self, id: AccountId, delta: Money) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found("Account", id))?;
        account.current_balance = account.current_balance.checked_add(&delta)?;
        Ok(())
    }

    /// Soft-deletes an account
    ///
    /// # Errors
    ///
    /// `Conflict` when the account still has ledger lines or child accounts.
    pub fn deactivate_account(&mut self, id: AccountId) -> Result<(), LedgerError> {
        if !self.accounts.contains_key(&id) {
            return Err(LedgerError::not_found("Account", id));
        }
        if self.account_has_lines(id) {
            return Err(LedgerError::conflict(
                "Account has ledger lines and cannot be deleted",
            ));
        }
        if self.account_has_children(id) {
            return Err(LedgerError::conflict(
                "Account has child accounts and cannot be deleted",
            ));
        }

        let account = self.accounts.get_mut(&id).expect("account checked above");
        account.is_active = false;
        info!(account_id = %id, "Account deactivated");
        Ok(())
    }

    /// Retires an account as part of a strategy (e.g., investor exit)
    ///
    /// Unlike [`Ledger::deactivate_account`], this skips the zero-lines
    /// guard: the exit entry has just posted against the account.
    pub(crate) fn retire_account(&mut self, id: AccountId) -> Result<(), LedgerError> {
        let account = self
            .accounts
            .get_mut(&id)
            .ok_or_else(|| LedgerError::not_found("Account", id))?;
        account.is_active = false;
        info!(account_id = %id, "Account retired by strategy");
        Ok(())
    }

    /// Returns true if any journal line references the account
    pub fn account_has_lines(&self, id: AccountId) -> bool {
        self.entries
            .iter()
            .any(|e| e.lines.iter().any(|l| l.account_id == id))
    }

    /// Returns true if any account has this one as parent
    pub fn account_has_children(&self, id: AccountId) -> bool {
        self.accounts.values().any(|a| a.parent_id == Some(id))
    }

    // ------------------------------------------------------------------
    // Period resolution
    // ------------------------------------------------------------------

    /// Finds the period covering a date, creating a one-day period when none does
    pub fn resolve_period(&mut self, company_id: CompanyId, date: NaiveDate) -> PeriodId {
        if let Some(period) = self
            .periods
            .iter()
            .find(|p| p.company_id == company_id && p.contains(date))
        {
            return period.id;
        }

        let period = AccountingPeriod::single_day(company_id, date);
        let id = period.id;
        debug!(period_id = %id, %date, "Created one-day accounting period");
        self.periods.push(period);
        id
    }

    /// Gets a period by ID
    pub fn period(&self, id: PeriodId) -> Result<&AccountingPeriod, LedgerError> {
        self.periods
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| LedgerError::not_found("Period", id))
    }

    /// Closes a period to further postings
    pub fn close_period(&mut self, id: PeriodId) -> Result<(), LedgerError> {
        let period = self
            .periods
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| LedgerError::not_found("Period", id))?;
        period.is_closed = true;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Posting engine
    // ------------------------------------------------------------------

    /// Posts a balanced entry and applies balance deltas to every touched account
    ///
    /// All validation happens before the first balance mutation, so a failed
    /// posting leaves no partial state behind.
    ///
    /// # Errors
    ///
    /// - `Validation` on malformed lines or cross-company/cross-currency legs
    /// - `Unbalanced` when debits and credits disagree beyond the tolerance
    /// - `NotFound` when a referenced account is missing or inactive
    /// - `InvalidState` when the covering period is closed
    pub fn post_entry(&mut self, draft: EntryDraft) -> Result<LedgerEntry, LedgerError> {
        draft.validate()?;
        self.check_period_open(draft.company_id, draft.date)?;

        // Resolve accounts and compute every delta up front
        let mut deltas: Vec<(AccountId, Money)> = Vec::with_capacity(draft.lines.len());
        for line in &draft.lines {
            let account = self.active_account(line.account_id)?;
            if account.company_id != draft.company_id {
                return Err(LedgerError::validation(format!(
                    "Account {} belongs to a different company",
                    account.code
                )));
            }
            if line.amount().currency() != self.currency {
                return Err(LedgerError::validation(format!(
                    "Line currency {} does not match ledger currency {}",
                    line.amount().currency(),
                    self.currency
                )));
            }
            deltas.push((line.account_id, account.balance_delta(line.side(), line.amount())));
        }

        let period_id = self.resolve_period(draft.company_id, draft.date);
        let number = self.allocate_transaction_number(draft.company_id, &draft);

        for (account_id, delta) in &deltas {
            self.adjust_balance(*account_id, *delta)?;
        }

        let (debits, _) = draft.totals();
        let entry = LedgerEntry {
            id: EntryId::new(),
            company_id: draft.company_id,
            period_id,
            transaction_number: number,
            date: draft.date,
            description: draft.description,
            kind: draft.kind,
            total_amount: Money::new(debits, self.currency),
            external_source: draft.external_source,
            status: EntryStatus::Posted,
            lines: draft.lines,
            created_at: Utc::now(),
        };

        info!(
            entry_id = %entry.id,
            number = %entry.transaction_number,
            lines = entry.lines.len(),
            total = %entry.total_amount,
            "Entry posted"
        );

        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Gets an entry by ID
    pub fn entry(&self, id: EntryId) -> Result<&LedgerEntry, LedgerError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| LedgerError::not_found("Transaction", id))
    }

    /// Lists a company's entries in posting order
    pub fn entries_for_company(&self, company_id: CompanyId) -> Vec<&LedgerEntry> {
        self.entries
            .iter()
            .filter(|e| e.company_id == company_id)
            .collect()
    }

    /// Voids a posted entry, reversing its balance effect exactly
    ///
    /// The entry and its lines are retained with status `Void`; the journal
    /// keeps the full audit trail. Voiding anything but a posted entry is
    /// `InvalidState`.
    pub fn void_entry(&mut self, id: EntryId, reason: &str) -> Result<LedgerEntry, LedgerError> {
        let index = self
            .entries
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| LedgerError::not_found("Transaction", id))?;

        if self.entries[index].status != EntryStatus::Posted {
            return Err(LedgerError::invalid_state(format!(
                "Only posted entries can be voided, entry {} is {:?}",
                id, self.entries[index].status
            )));
        }

        // Exact mirror of posting: the same deltas, sign-flipped
        let mut deltas: Vec<(AccountId, Money)> = Vec::new();
        for line in &self.entries[index].lines {
            let account = self.account(line.account_id)?;
            deltas.push((
                line.account_id,
                -account.balance_delta(line.side(), line.amount()),
            ));
        }

        for (account_id, delta) in &deltas {
            self.adjust_balance(*account_id, *delta)?;
        }

        let entry = &mut self.entries[index];
        entry.status = EntryStatus::Void;
        entry.description = format!("{} (void: {})", entry.description, reason);

        info!(entry_id = %id, %reason, "Entry voided");
        Ok(entry.clone())
    }

    /// Replaces a posted entry: void + re-post as one unit
    ///
    /// The net balance effect is apply-new minus apply-original, never a
    /// blind re-application. Correcting an entry with identical legs leaves
    /// every balance unchanged.
    pub fn correct_entry(
        &mut self,
        id: EntryId,
        replacement: EntryDraft,
    ) -> Result<LedgerEntry, LedgerError> {
        let original = self.entry(id)?;
        if original.status != EntryStatus::Posted {
            return Err(LedgerError::invalid_state(format!(
                "Only posted entries can be corrected, entry {} is {:?}",
                id, original.status
            )));
        }
        if replacement.company_id != original.company_id {
            return Err(LedgerError::validation(
                "Correction must stay within the original entry's company",
            ));
        }

        // Validate everything the re-post will need before voiding, so a
        // bad replacement leaves the original untouched
        replacement.validate()?;
        self.check_period_open(replacement.company_id, replacement.date)?;
        for line in &replacement.lines {
            let account = self.active_account(line.account_id)?;
            if account.company_id != replacement.company_id {
                return Err(LedgerError::validation(format!(
                    "Account {} belongs to a different company",
                    account.code
                )));
            }
        }

        self.void_entry(id, "corrected")?;
        self.post_entry(replacement)
    }

    /// Updates the description of a posted entry
    ///
    /// The one header field that may change in place; everything else goes
    /// through [`Ledger::correct_entry`].
    pub fn update_entry_description(
        &mut self,
        id: EntryId,
        description: impl Into<String>,
    ) -> Result<(), LedgerError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or_else(|| LedgerError::not_found("Transaction", id))?;
        if entry.status == EntryStatus::Void {
            return Err(LedgerError::invalid_state("Cannot edit a void entry"));
        }
        entry.description = description.into();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn check_period_open(
        &self,
        company_id: CompanyId,
        date: NaiveDate,
    ) -> Result<(), LedgerError> {
        let closed = self
            .periods
            .iter()
            .any(|p| p.company_id == company_id && p.contains(date) && p.is_closed);
        if closed {
            return Err(LedgerError::invalid_state(format!(
                "Period covering {} is closed",
                date
            )));
        }
        Ok(())
    }

    fn allocate_transaction_number(&self, company_id: CompanyId, draft: &EntryDraft) -> String {
        loop {
            let number = transaction_number(draft.kind, draft.date);
            let taken = self
                .entries
                .iter()
                .any(|e| e.company_id == company_id && e.transaction_number == number);
            if !taken {
                return number;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::account::AccountType;
    use crate::entry::TransactionKind;
    use rust_decimal_macros::dec;

    fn usd(amount: rust_decimal::Decimal) -> Money {
        Money::new(amount, Currency::USD)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn setup() -> (Ledger, CompanyId, AccountId, AccountId) {
        let mut ledger = Ledger::new(Currency::USD);
        let company = CompanyId::new();

        let cash = ledger
            .create_account(NewAccount::new(company, "Cash", AccountType::Asset, usd(dec!(1000))))
            .unwrap();
        let revenue = ledger
            .create_account(NewAccount::new(company, "Sales", AccountType::Revenue, usd(dec!(0))))
            .unwrap();

        (ledger, company, cash.id, revenue.id)
    }

    #[test]
    fn test_create_account_generates_sequential_codes() {
        let (mut ledger, company, cash, _) = setup();

        assert_eq!(ledger.account(cash).unwrap().code, "A001");

        let second = ledger
            .create_account(NewAccount::new(company, "Bank", AccountType::Asset, usd(dec!(0))))
            .unwrap();
        assert_eq!(second.code, "A002");
    }

    #[test]
    fn test_codes_are_scoped_per_company() {
        let (mut ledger, _, _, _) = setup();
        let other = CompanyId::new();

        let account = ledger
            .create_account(NewAccount::new(other, "Cash", AccountType::Asset, usd(dec!(0))))
            .unwrap();
        assert_eq!(account.code, "A001");
    }

    #[test]
    fn test_expense_opening_balance_stored_negative() {
        let (mut ledger, company, _, _) = setup();

        let rent = ledger
            .create_account(NewAccount::new(company, "Rent", AccountType::Expense, usd(dec!(500))))
            .unwrap();

        assert_eq!(rent.current_balance.amount(), dec!(-500));
        assert_eq!(rent.opening_balance.amount(), dec!(-500));
    }

    #[test]
    fn test_create_account_rejects_empty_name() {
        let (mut ledger, company, _, _) = setup();
        let result =
            ledger.create_account(NewAccount::new(company, "  ", AccountType::Asset, usd(dec!(0))));
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_post_entry_updates_balances() {
        let (mut ledger, company, cash, revenue) = setup();

        let entry = ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(250)))
                    .credit(revenue, usd(dec!(250))),
            )
            .unwrap();

        assert_eq!(entry.status, EntryStatus::Posted);
        assert_eq!(ledger.account(cash).unwrap().current_balance.amount(), dec!(1250));
        assert_eq!(ledger.account(revenue).unwrap().current_balance.amount(), dec!(250));
    }

    #[test]
    fn test_post_entry_rejects_unbalanced() {
        let (mut ledger, company, cash, revenue) = setup();

        let result = ledger.post_entry(
            EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Bad")
                .debit(cash, usd(dec!(250)))
                .credit(revenue, usd(dec!(200))),
        );

        assert!(matches!(result, Err(LedgerError::Unbalanced { .. })));
        // No partial balance updates
        assert_eq!(ledger.account(cash).unwrap().current_balance.amount(), dec!(1000));
    }

    #[test]
    fn test_post_entry_rejects_inactive_account() {
        let (mut ledger, company, cash, _) = setup();

        let orphan = ledger
            .create_account(NewAccount::new(company, "Old", AccountType::Revenue, usd(dec!(0))))
            .unwrap();
        ledger.deactivate_account(orphan.id).unwrap();

        let result = ledger.post_entry(
            EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                .debit(cash, usd(dec!(100)))
                .credit(orphan.id, usd(dec!(100))),
        );
        assert!(matches!(result, Err(LedgerError::NotFound { .. })));
    }

    #[test]
    fn test_post_entry_resolves_one_day_period() {
        let (mut ledger, company, cash, revenue) = setup();

        let entry = ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 7, 4), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(10)))
                    .credit(revenue, usd(dec!(10))),
            )
            .unwrap();

        let period = ledger.period(entry.period_id).unwrap();
        assert_eq!(period.start_date, date(2024, 7, 4));
        assert_eq!(period.end_date, date(2024, 7, 4));
    }

    #[test]
    fn test_posting_into_closed_period_rejected() {
        let (mut ledger, company, cash, revenue) = setup();

        let period_id = ledger.resolve_period(company, date(2024, 5, 1));
        ledger.close_period(period_id).unwrap();

        let result = ledger.post_entry(
            EntryDraft::new(company, date(2024, 5, 1), TransactionKind::General, "Late")
                .debit(cash, usd(dec!(10)))
                .credit(revenue, usd(dec!(10))),
        );
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn test_void_restores_balances_exactly() {
        let (mut ledger, company, cash, revenue) = setup();

        let entry = ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(400)))
                    .credit(revenue, usd(dec!(400))),
            )
            .unwrap();

        let voided = ledger.void_entry(entry.id, "entered twice").unwrap();
        assert_eq!(voided.status, EntryStatus::Void);
        assert_eq!(ledger.account(cash).unwrap().current_balance.amount(), dec!(1000));
        assert_eq!(ledger.account(revenue).unwrap().current_balance.amount(), dec!(0));
    }

    #[test]
    fn test_void_twice_rejected() {
        let (mut ledger, company, cash, revenue) = setup();

        let entry = ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(400)))
                    .credit(revenue, usd(dec!(400))),
            )
            .unwrap();

        ledger.void_entry(entry.id, "first").unwrap();
        let result = ledger.void_entry(entry.id, "second");
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn test_correct_entry_nets_to_difference() {
        let (mut ledger, company, cash, revenue) = setup();

        let entry = ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(300)))
                    .credit(revenue, usd(dec!(300))),
            )
            .unwrap();

        // Should have been 350
        ledger
            .correct_entry(
                entry.id,
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::Correction, "Sale")
                    .debit(cash, usd(dec!(350)))
                    .credit(revenue, usd(dec!(350))),
            )
            .unwrap();

        assert_eq!(ledger.account(cash).unwrap().current_balance.amount(), dec!(1350));
        assert_eq!(ledger.account(revenue).unwrap().current_balance.amount(), dec!(350));
        assert_eq!(ledger.entry(entry.id).unwrap().status, EntryStatus::Void);
    }

    #[test]
    fn test_correct_with_identical_legs_is_noop_on_balances() {
        let (mut ledger, company, cash, revenue) = setup();

        let entry = ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(300)))
                    .credit(revenue, usd(dec!(300))),
            )
            .unwrap();

        ledger
            .correct_entry(
                entry.id,
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::Correction, "Sale")
                    .debit(cash, usd(dec!(300)))
                    .credit(revenue, usd(dec!(300))),
            )
            .unwrap();

        assert_eq!(ledger.account(cash).unwrap().current_balance.amount(), dec!(1300));
        assert_eq!(ledger.account(revenue).unwrap().current_balance.amount(), dec!(300));
    }

    #[test]
    fn test_correct_with_bad_replacement_leaves_original_posted() {
        let (mut ledger, company, cash, revenue) = setup();

        let entry = ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(300)))
                    .credit(revenue, usd(dec!(300))),
            )
            .unwrap();

        let result = ledger.correct_entry(
            entry.id,
            EntryDraft::new(company, date(2024, 3, 1), TransactionKind::Correction, "Bad")
                .debit(cash, usd(dec!(100)))
                .credit(revenue, usd(dec!(50))),
        );

        assert!(matches!(result, Err(LedgerError::Unbalanced { .. })));
        assert_eq!(ledger.entry(entry.id).unwrap().status, EntryStatus::Posted);
        assert_eq!(ledger.account(cash).unwrap().current_balance.amount(), dec!(1300));
    }

    #[test]
    fn test_deactivate_blocked_by_lines() {
        let (mut ledger, company, cash, revenue) = setup();

        ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(100)))
                    .credit(revenue, usd(dec!(100))),
            )
            .unwrap();

        let result = ledger.deactivate_account(cash);
        assert!(matches!(result, Err(LedgerError::Conflict(_))));
    }

    #[test]
    fn test_deactivate_blocked_by_children() {
        let (mut ledger, company, cash, _) = setup();

        ledger
            .create_account(
                NewAccount::new(company, "Petty Cash", AccountType::Asset, usd(dec!(0)))
                    .child_of(cash),
            )
            .unwrap();

        let result = ledger.deactivate_account(cash);
        assert!(matches!(result, Err(LedgerError::Conflict(_))));
    }

    #[test]
    fn test_code_not_reused_after_soft_delete() {
        let (mut ledger, company, _, _) = setup();

        let temp = ledger
            .create_account(NewAccount::new(company, "Temp", AccountType::Asset, usd(dec!(0))))
            .unwrap();
        assert_eq!(temp.code, "A002");

        ledger.deactivate_account(temp.id).unwrap();

        let next = ledger
            .create_account(NewAccount::new(company, "Next", AccountType::Asset, usd(dec!(0))))
            .unwrap();
        assert_eq!(next.code, "A003");
    }

    #[test]
    fn test_update_account_type_change_blocked_with_lines() {
        let (mut ledger, company, cash, revenue) = setup();

        ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(100)))
                    .credit(revenue, usd(dec!(100))),
            )
            .unwrap();

        let result = ledger.update_account(
            cash,
            AccountPatch {
                account_type: Some(AccountType::Expense),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn test_update_account_duplicate_code_rejected() {
        let (mut ledger, company, cash, _) = setup();

        let second = ledger
            .create_account(NewAccount::new(company, "Bank", AccountType::Asset, usd(dec!(0))))
            .unwrap();

        let result = ledger.update_account(
            second.id,
            AccountPatch {
                code: Some(ledger.account(cash).unwrap().code.clone()),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(LedgerError::Conflict(_))));
    }

    #[test]
    fn test_update_account_parent_cycle_rejected() {
        let (mut ledger, company, cash, _) = setup();

        let child = ledger
            .create_account(
                NewAccount::new(company, "Petty Cash", AccountType::Asset, usd(dec!(0)))
                    .child_of(cash),
            )
            .unwrap();

        let result = ledger.update_account(
            cash,
            AccountPatch {
                parent_id: Some(child.id),
                ..Default::default()
            },
        );
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_description_editable_on_posted_but_not_void() {
        let (mut ledger, company, cash, revenue) = setup();

        let entry = ledger
            .post_entry(
                EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                    .debit(cash, usd(dec!(100)))
                    .credit(revenue, usd(dec!(100))),
            )
            .unwrap();

        ledger
            .update_entry_description(entry.id, "Sale, reworded")
            .unwrap();
        assert_eq!(ledger.entry(entry.id).unwrap().description, "Sale, reworded");

        ledger.void_entry(entry.id, "done").unwrap();
        let result = ledger.update_entry_description(entry.id, "Too late");
        assert!(matches!(result, Err(LedgerError::InvalidState(_))));
    }

    #[test]
    fn test_transaction_numbers_unique_per_company() {
        let (mut ledger, company, cash, revenue) = setup();

        let mut numbers = std::collections::HashSet::new();
        for _ in 0..20 {
            let entry = ledger
                .post_entry(
                    EntryDraft::new(company, date(2024, 3, 1), TransactionKind::General, "Sale")
                        .debit(cash, usd(dec!(10)))
                        .credit(revenue, usd(dec!(10))),
                )
                .unwrap();
            assert!(numbers.insert(entry.transaction_number));
        }
    }
}
