//! Integration tests for the accounting core
//!
//! These tests verify cross-module workflows end-to-end on the canonical
//! engine: a company's book from first account to investor exit, with the
//! materialized balances checked against the full line history throughout.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::{CompanyId, Currency, Money};
use domain_ledger::{AccountType, EntryStatus, Ledger, LedgerError, Side};
use test_utils::{
    assert_balance, assert_balance_consistent, assert_entry_balanced, seeded_ledger,
    TestAccountBuilder, TestEntryBuilder,
};

fn usd(amount: Decimal) -> Money {
    Money::new(amount, Currency::USD)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod company_lifecycle {
    use super::*;

    /// A small company's first quarter: seed capital, a liability, running
    /// expenses, a profit distribution, and an investor exit. Every posting
    /// stays balanced and every materialized balance matches its history.
    #[test]
    fn test_first_quarter_workflow() {
        let company = CompanyId::new();
        let mut ledger = Ledger::new(Currency::USD);

        let cash = ledger
            .create_account(
                TestAccountBuilder::new(company)
                    .named("Cash")
                    .opening(dec!(20000))
                    .build(),
            )
            .unwrap()
            .id;

        // Two investors buy in
        ledger
            .record_external_investment(company, date(2024, 1, 10), cash, "Dana", dec!(60), usd(dec!(30000)))
            .unwrap();
        ledger
            .record_external_investment(company, date(2024, 1, 11), cash, "Sam", dec!(40), usd(dec!(20000)))
            .unwrap();
        assert_balance(&ledger, cash, dec!(70000));

        // Finance a truck; the free-text kind normalizes to a vehicle asset
        let liability_entry = ledger
            .record_liability(company, date(2024, 1, 20), "Truck Loan", "truck", usd(dec!(15000)), None)
            .unwrap();
        assert_entry_balanced(&liability_entry);

        // Pay rent out of cash
        let rent = ledger
            .create_account(
                TestAccountBuilder::new(company)
                    .named("Rent")
                    .of_type(AccountType::Expense)
                    .opening(dec!(2400))
                    .build(),
            )
            .unwrap()
            .id;
        assert_balance(&ledger, rent, dec!(-2400));

        ledger
            .transfer(company, date(2024, 2, 1), cash, rent, usd(dec!(800)), "February rent")
            .unwrap();
        assert_balance(&ledger, cash, dec!(69200));
        assert_balance(&ledger, rent, dec!(-1600));

        // Distribute Q1 profit 60/40
        let distribution = ledger
            .distribute_profit(company, date(2024, 3, 31), usd(dec!(10000)))
            .unwrap();
        assert_entry_balanced(&distribution);

        let dana = ledger
            .find_account_by_name(company, AccountType::Equity, "Dana Equity")
            .unwrap();
        let sam = ledger
            .find_account_by_name(company, AccountType::Equity, "Sam Equity")
            .unwrap();
        assert_eq!(dana.current_balance.amount(), dec!(36000));
        assert_eq!(sam.current_balance.amount(), dec!(24000));

        // Sam exits for less than the stake; the difference stays in the book
        let sam_id = sam.id;
        let exit = ledger
            .investor_exit(company, date(2024, 3, 31), sam_id, cash, usd(dec!(22000)))
            .unwrap();
        assert_entry_balanced(&exit);
        assert_balance(&ledger, sam_id, dec!(0));
        assert!(!ledger.account(sam_id).unwrap().is_active);
        assert_balance(&ledger, cash, dec!(47200));

        // Every account's materialized balance still matches its history
        for account in ledger.accounts_for_company(company) {
            assert_balance_consistent(&ledger, account.id);
        }
    }

    #[test]
    fn test_asset_protection_after_uneven_distributions() {
        let company = CompanyId::new();
        let mut ledger = Ledger::new(Currency::USD);

        let cash = ledger
            .create_account(TestAccountBuilder::new(company).named("Cash").build())
            .unwrap()
            .id;

        ledger
            .record_external_investment(company, date(2024, 1, 1), cash, "A", dec!(50), usd(dec!(6000)))
            .unwrap();
        ledger
            .record_external_investment(company, date(2024, 1, 1), cash, "B", dec!(50), usd(dec!(2000)))
            .unwrap();

        // Equal ownership, unequal balances: protection draws 3:1
        let entry = ledger
            .protect_assets(company, date(2024, 2, 1), cash, usd(dec!(1000)))
            .unwrap();
        assert_entry_balanced(&entry);

        let a = ledger
            .find_account_by_name(company, AccountType::Equity, "A Equity")
            .unwrap();
        let b = ledger
            .find_account_by_name(company, AccountType::Equity, "B Equity")
            .unwrap();
        assert_eq!(a.current_balance.amount(), dec!(5250));
        assert_eq!(b.current_balance.amount(), dec!(1750));
        assert_balance(&ledger, cash, dec!(7000));
    }
}

mod correction_workflows {
    use super::*;

    #[test]
    fn test_correction_replaces_amount_without_double_counting() {
        let company = CompanyId::new();
        let (mut ledger, cash, revenue) = seeded_ledger(company);

        let entry = ledger
            .post_entry(
                TestEntryBuilder::new(company)
                    .debit(cash, dec!(900))
                    .credit(revenue, dec!(900))
                    .build(),
            )
            .unwrap();

        // The sale was actually 950
        let corrected = ledger
            .correct_entry(
                entry.id,
                TestEntryBuilder::new(company)
                    .debit(cash, dec!(950))
                    .credit(revenue, dec!(950))
                    .described("Corrected sale amount")
                    .build(),
            )
            .unwrap();

        assert_eq!(corrected.status, EntryStatus::Posted);
        assert_balance(&ledger, cash, dec!(1950));
        assert_balance(&ledger, revenue, dec!(950));
        assert_eq!(ledger.entry(entry.id).unwrap().status, EntryStatus::Void);

        assert_balance_consistent(&ledger, cash);
        assert_balance_consistent(&ledger, revenue);
    }

    #[test]
    fn test_void_then_simple_entry_round_trip() {
        let company = CompanyId::new();
        let (mut ledger, cash, _) = seeded_ledger(company);

        let entry = ledger
            .record_simple_entry(
                company,
                date(2024, 5, 5),
                cash,
                Side::Debit,
                usd(dec!(120)),
                "Cash found in the drawer",
            )
            .unwrap();
        assert_balance(&ledger, cash, dec!(1120));

        ledger.void_entry(entry.id, "counted twice").unwrap();
        assert_balance(&ledger, cash, dec!(1000));

        for account in ledger.accounts_for_company(company) {
            assert_balance_consistent(&ledger, account.id);
        }
    }

    #[test]
    fn test_posted_entries_resist_double_void() {
        let company = CompanyId::new();
        let (mut ledger, cash, revenue) = seeded_ledger(company);

        let entry = ledger
            .post_entry(
                TestEntryBuilder::new(company)
                    .debit(cash, dec!(10))
                    .credit(revenue, dec!(10))
                    .build(),
            )
            .unwrap();

        ledger.void_entry(entry.id, "first").unwrap();
        assert!(matches!(
            ledger.void_entry(entry.id, "second"),
            Err(LedgerError::InvalidState(_))
        ));
        assert_balance(&ledger, cash, dec!(1000));
    }
}

mod period_workflows {
    use super::*;

    #[test]
    fn test_lazy_periods_reused_within_their_range() {
        let company = CompanyId::new();
        let (mut ledger, cash, revenue) = seeded_ledger(company);

        let first = ledger
            .post_entry(
                TestEntryBuilder::new(company)
                    .on(date(2024, 6, 10))
                    .debit(cash, dec!(5))
                    .credit(revenue, dec!(5))
                    .build(),
            )
            .unwrap();
        let second = ledger
            .post_entry(
                TestEntryBuilder::new(company)
                    .on(date(2024, 6, 10))
                    .debit(cash, dec!(7))
                    .credit(revenue, dec!(7))
                    .build(),
            )
            .unwrap();

        assert_eq!(first.period_id, second.period_id);

        let other_day = ledger
            .post_entry(
                TestEntryBuilder::new(company)
                    .on(date(2024, 6, 11))
                    .debit(cash, dec!(3))
                    .credit(revenue, dec!(3))
                    .build(),
            )
            .unwrap();
        assert_ne!(first.period_id, other_day.period_id);
    }

    #[test]
    fn test_closed_period_blocks_posting_but_not_other_days() {
        let company = CompanyId::new();
        let (mut ledger, cash, revenue) = seeded_ledger(company);

        let period_id = ledger.resolve_period(company, date(2024, 6, 10));
        ledger.close_period(period_id).unwrap();

        let blocked = ledger.post_entry(
            TestEntryBuilder::new(company)
                .on(date(2024, 6, 10))
                .debit(cash, dec!(5))
                .credit(revenue, dec!(5))
                .build(),
        );
        assert!(matches!(blocked, Err(LedgerError::InvalidState(_))));

        let open_day = ledger.post_entry(
            TestEntryBuilder::new(company)
                .on(date(2024, 6, 11))
                .debit(cash, dec!(5))
                .credit(revenue, dec!(5))
                .build(),
        );
        assert!(open_day.is_ok());
    }
}
