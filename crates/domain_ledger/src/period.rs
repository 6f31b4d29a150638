//! Accounting periods
//!
//! Transactions are bucketed into date-range periods for closing and
//! reporting. When no period covers a posting date, the resolver creates a
//! one-day period on the fly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use core_kernel::{CompanyId, PeriodId};

use crate::error::LedgerError;

/// A date-range bucket transactions are assigned to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountingPeriod {
    /// Unique identifier
    pub id: PeriodId,
    /// Owning company
    pub company_id: CompanyId,
    /// First day of the period (inclusive)
    pub start_date: NaiveDate,
    /// Last day of the period (inclusive)
    pub end_date: NaiveDate,
    /// Whether the period is closed to new postings
    pub is_closed: bool,
}

impl AccountingPeriod {
    /// Creates a period covering a date range
    pub fn new(
        company_id: CompanyId,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Self, LedgerError> {
        if start_date > end_date {
            return Err(LedgerError::validation(format!(
                "Period start {} is after end {}",
                start_date, end_date
            )));
        }

        Ok(Self {
            id: PeriodId::new(),
            company_id,
            start_date,
            end_date,
            is_closed: false,
        })
    }

    /// Creates the trivial one-day period used for lazy resolution
    pub fn single_day(company_id: CompanyId, date: NaiveDate) -> Self {
        Self {
            id: PeriodId::new(),
            company_id,
            start_date: date,
            end_date: date,
            is_closed: false,
        }
    }

    /// Returns true if the given date falls within this period
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start_date && date <= self.end_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_containment_is_inclusive() {
        let period =
            AccountingPeriod::new(CompanyId::new(), date(2024, 1, 1), date(2024, 1, 31)).unwrap();

        assert!(period.contains(date(2024, 1, 1)));
        assert!(period.contains(date(2024, 1, 31)));
        assert!(period.contains(date(2024, 1, 15)));
        assert!(!period.contains(date(2024, 2, 1)));
        assert!(!period.contains(date(2023, 12, 31)));
    }

    #[test]
    fn test_inverted_range_rejected() {
        let result = AccountingPeriod::new(CompanyId::new(), date(2024, 2, 1), date(2024, 1, 1));
        assert!(matches!(result, Err(LedgerError::Validation(_))));
    }

    #[test]
    fn test_single_day_period() {
        let day = date(2024, 6, 15);
        let period = AccountingPeriod::single_day(CompanyId::new(), day);

        assert_eq!(period.start_date, day);
        assert_eq!(period.end_date, day);
        assert!(period.contains(day));
        assert!(!period.is_closed);
    }
}
