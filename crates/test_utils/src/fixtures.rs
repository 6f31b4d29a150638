//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the
//! accounting system. These fixtures are designed to be consistent and
//! predictable for unit tests.

use chrono::NaiveDate;
use core_kernel::{CompanyId, Currency, Money};
use rust_decimal_macros::dec;

/// Fixture for Money test data
pub struct MoneyFixtures;

impl MoneyFixtures {
    /// Creates a standard USD amount for testing
    pub fn usd_100() -> Money {
        Money::new(dec!(100.00), Currency::USD)
    }

    /// Creates a typical opening balance
    pub fn usd_opening() -> Money {
        Money::new(dec!(1000.00), Currency::USD)
    }

    /// Creates a typical investor buy-in amount
    pub fn usd_investment() -> Money {
        Money::new(dec!(50000.00), Currency::USD)
    }

    /// Creates a zero amount
    pub fn usd_zero() -> Money {
        Money::zero(Currency::USD)
    }

    /// Creates a EUR amount for currency mismatch tests
    pub fn eur_100() -> Money {
        Money::new(dec!(100.00), Currency::EUR)
    }
}

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard posting date (Mar 15, 2024)
    pub fn posting_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    /// First day of the standard fiscal year
    pub fn year_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    /// Last day of the standard fiscal year
    pub fn year_end() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 12, 31).unwrap()
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// A fresh company scope
    pub fn company() -> CompanyId {
        CompanyId::new()
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// A typical account name
    pub fn account_name() -> &'static str {
        "Operating Cash"
    }

    /// A typical investor name
    pub fn investor_name() -> &'static str {
        "Dana Reyes"
    }

    /// A typical posting description
    pub fn description() -> &'static str {
        "Monthly service revenue"
    }
}
