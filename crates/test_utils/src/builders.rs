//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant fields
//! while using defaults for everything else.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{AccountId, CompanyId, Currency, Money};
use domain_ledger::{AccountType, EntryDraft, Ledger, NewAccount, TransactionKind};

use crate::fixtures::{StringFixtures, TemporalFixtures};

/// Builder for account specifications with test defaults
pub struct TestAccountBuilder {
    company_id: CompanyId,
    name: String,
    account_type: AccountType,
    opening_balance: Money,
    is_contra: bool,
    description: Option<String>,
    investor: Option<(String, Decimal)>,
    parent_id: Option<AccountId>,
}

impl TestAccountBuilder {
    /// Creates a builder for an asset account with a zero opening balance
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            company_id,
            name: StringFixtures::account_name().to_string(),
            account_type: AccountType::Asset,
            opening_balance: Money::zero(Currency::USD),
            is_contra: false,
            description: None,
            investor: None,
            parent_id: None,
        }
    }

    /// Sets the account name
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Sets the account type
    pub fn of_type(mut self, account_type: AccountType) -> Self {
        self.account_type = account_type;
        self
    }

    /// Sets the opening balance
    pub fn opening(mut self, amount: Decimal) -> Self {
        self.opening_balance = Money::new(amount, Currency::USD);
        self
    }

    /// Marks the account as contra
    pub fn contra(mut self) -> Self {
        self.is_contra = true;
        self
    }

    /// Sets the description
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Tags the account with an investor stake
    pub fn investor(mut self, name: impl Into<String>, percentage: Decimal) -> Self {
        self.investor = Some((name.into(), percentage));
        self
    }

    /// Sets the parent account
    pub fn child_of(mut self, parent_id: AccountId) -> Self {
        self.parent_id = Some(parent_id);
        self
    }

    /// Builds the account specification
    pub fn build(self) -> NewAccount {
        let mut spec = NewAccount::new(
            self.company_id,
            self.name,
            self.account_type,
            self.opening_balance,
        );
        if self.is_contra {
            spec = spec.contra();
        }
        if let Some(description) = self.description {
            spec = spec.with_description(description);
        }
        if let Some((name, percentage)) = self.investor {
            spec = spec.with_investor(name, percentage);
        }
        if let Some(parent_id) = self.parent_id {
            spec = spec.child_of(parent_id);
        }
        spec
    }
}

/// Builder for balanced entry drafts with test defaults
pub struct TestEntryBuilder {
    company_id: CompanyId,
    date: NaiveDate,
    kind: TransactionKind,
    description: String,
    legs: Vec<(AccountId, Decimal, Decimal)>,
}

impl TestEntryBuilder {
    /// Creates a builder for a general entry on the standard posting date
    pub fn new(company_id: CompanyId) -> Self {
        Self {
            company_id,
            date: TemporalFixtures::posting_date(),
            kind: TransactionKind::General,
            description: StringFixtures::description().to_string(),
            legs: Vec::new(),
        }
    }

    /// Sets the posting date
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }

    /// Sets the transaction kind
    pub fn of_kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the description
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Adds a debit leg
    pub fn debit(mut self, account_id: AccountId, amount: Decimal) -> Self {
        self.legs.push((account_id, amount, dec!(0)));
        self
    }

    /// Adds a credit leg
    pub fn credit(mut self, account_id: AccountId, amount: Decimal) -> Self {
        self.legs.push((account_id, dec!(0), amount));
        self
    }

    /// Builds the entry draft
    pub fn build(self) -> EntryDraft {
        let mut draft = EntryDraft::new(self.company_id, self.date, self.kind, self.description);
        for (account_id, debit, credit) in self.legs {
            if debit > Decimal::ZERO {
                draft = draft.debit(account_id, Money::new(debit, Currency::USD));
            } else {
                draft = draft.credit(account_id, Money::new(credit, Currency::USD));
            }
        }
        draft
    }
}

/// Creates a USD ledger seeded with a cash and a revenue account
///
/// Returns the ledger and the two account IDs, the minimum useful book for
/// posting tests.
pub fn seeded_ledger(company_id: CompanyId) -> (Ledger, AccountId, AccountId) {
    let mut ledger = Ledger::new(Currency::USD);

    let cash = ledger
        .create_account(
            TestAccountBuilder::new(company_id)
                .named("Cash")
                .opening(dec!(1000))
                .build(),
        )
        .expect("seed cash account")
        .id;
    let revenue = ledger
        .create_account(
            TestAccountBuilder::new(company_id)
                .named("Sales")
                .of_type(AccountType::Revenue)
                .build(),
        )
        .expect("seed revenue account")
        .id;

    (ledger, cash, revenue)
}
