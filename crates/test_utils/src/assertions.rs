//! Custom assertion helpers for domain types

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use core_kernel::AccountId;
use domain_ledger::{Ledger, LedgerEntry};

/// Asserts that an entry's debits equal its credits within the ledger
/// tolerance
pub fn assert_entry_balanced(entry: &LedgerEntry) {
    let debits: Decimal = entry.lines.iter().map(|l| l.debit.amount()).sum();
    let credits: Decimal = entry.lines.iter().map(|l| l.credit.amount()).sum();
    assert!(
        (debits - credits).abs() <= dec!(0.01),
        "entry {} is unbalanced: debits={} credits={}",
        entry.transaction_number,
        debits,
        credits
    );
}

/// Asserts an account's current balance
pub fn assert_balance(ledger: &Ledger, account_id: AccountId, expected: Decimal) {
    let account = ledger.account(account_id).expect("account exists");
    assert_eq!(
        account.current_balance.amount(),
        expected,
        "balance mismatch on {} ({})",
        account.code,
        account.name
    );
}

/// Asserts that an account's materialized balance equals its opening
/// balance plus the signed effect of every posted, non-void line
pub fn assert_balance_consistent(ledger: &Ledger, account_id: AccountId) {
    let account = ledger.account(account_id).expect("account exists");

    let mut expected = account.opening_balance;
    for entry in ledger.entries_for_company(account.company_id) {
        if entry.status != domain_ledger::EntryStatus::Posted {
            continue;
        }
        for line in &entry.lines {
            if line.account_id == account_id {
                expected = expected + account.balance_delta(line.side(), line.amount());
            }
        }
    }

    assert_eq!(
        account.current_balance, expected,
        "materialized balance of {} diverged from its line history",
        account.code
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::{seeded_ledger, TestEntryBuilder};
    use core_kernel::CompanyId;

    #[test]
    fn test_consistency_assertion_sees_posts_and_voids() {
        let company = CompanyId::new();
        let (mut ledger, cash, revenue) = seeded_ledger(company);

        let entry = ledger
            .post_entry(
                TestEntryBuilder::new(company)
                    .debit(cash, dec!(250))
                    .credit(revenue, dec!(250))
                    .build(),
            )
            .unwrap();
        assert_entry_balanced(&entry);
        assert_balance_consistent(&ledger, cash);
        assert_balance_consistent(&ledger, revenue);

        ledger.void_entry(entry.id, "test").unwrap();
        assert_balance_consistent(&ledger, cash);
        assert_balance(&ledger, cash, dec!(1000));
    }
}
