//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data that
//! maintains domain invariants, plus fake-data helpers for realistic names.

use fake::faker::company::en::CompanyName;
use fake::faker::name::en::Name;
use fake::Fake;
use proptest::prelude::*;
use rust_decimal::Decimal;

use core_kernel::{Currency, Money};
use domain_ledger::AccountType;

/// Strategy for generating valid positive amounts in minor units
pub fn positive_amount_minor_strategy() -> impl Strategy<Value = i64> {
    1i64..1_000_000_000i64
}

/// Strategy for generating valid positive USD Money values
pub fn positive_money_strategy() -> impl Strategy<Value = Money> {
    positive_amount_minor_strategy().prop_map(|amount| Money::from_minor(amount, Currency::USD))
}

/// Strategy for generating any account type
pub fn account_type_strategy() -> impl Strategy<Value = AccountType> {
    prop_oneof![
        Just(AccountType::Asset),
        Just(AccountType::Liability),
        Just(AccountType::Equity),
        Just(AccountType::Revenue),
        Just(AccountType::Expense),
    ]
}

/// Strategy for ownership percentages in (0, 100], two decimal places
pub fn ownership_percentage_strategy() -> impl Strategy<Value = Decimal> {
    (1u32..=10_000u32).prop_map(|n| Decimal::new(n as i64, 2))
}

/// Strategy for sets of ownership percentages summing to at most 100
pub fn ownership_set_strategy() -> impl Strategy<Value = Vec<Decimal>> {
    proptest::collection::vec(1u32..4000u32, 1..6).prop_map(|raw| {
        let sum: u32 = raw.iter().sum();
        raw.into_iter()
            .map(|n| {
                let pct = Decimal::new(n as i64, 2);
                if sum > 10_000 {
                    // Scale down so the set stays within 100%
                    (pct * Decimal::new(9900, 0) / Decimal::from(sum)).round_dp(4)
                } else {
                    pct
                }
            })
            .collect()
    })
}

/// A plausible investor name
pub fn fake_investor_name() -> String {
    Name().fake()
}

/// A plausible company name
pub fn fake_company_name() -> String {
    CompanyName().fake()
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest! {
        #[test]
        fn ownership_sets_stay_within_bounds(set in ownership_set_strategy()) {
            let total: Decimal = set.iter().sum();
            prop_assert!(total <= Decimal::ONE_HUNDRED);
            prop_assert!(set.iter().all(|p| *p > Decimal::ZERO));
        }
    }

    #[test]
    fn fake_names_are_nonempty() {
        assert!(!fake_investor_name().is_empty());
        assert!(!fake_company_name().is_empty());
    }
}
