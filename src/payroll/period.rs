use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};

use crate::error::PayrollError;

/// One calendar month. A pay run is uniquely identified by this value:
/// the orchestrator permits at most one run whose payment date falls inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PayPeriod {
    year: i32,
    month: u32,
}

impl PayPeriod {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        if (1..=12).contains(&month) {
            Some(PayPeriod { year, month })
        } else {
            None
        }
    }

    /// The period the given date falls in.
    pub fn containing(date: NaiveDate) -> Self {
        PayPeriod {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn month_start(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .expect("month validated at construction")
    }

    /// Last day of the month, inclusive.
    pub fn month_end(&self) -> NaiveDate {
        let (y, m) = if self.month == 12 {
            (self.year + 1, 1)
        } else {
            (self.year, self.month + 1)
        };
        NaiveDate::from_ymd_opt(y, m, 1)
            .expect("month validated at construction")
            .pred_opt()
            .expect("first of month has a predecessor")
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl fmt::Display for PayPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for PayPeriod {
    type Err = PayrollError;

    /// Parses the `YYYY-MM` form used by the payroll endpoints.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bad = || PayrollError::invalid_input("month", format!("expected YYYY-MM, got '{s}'"));

        let (year, month) = s.split_once('-').ok_or_else(bad)?;
        let year: i32 = year.parse().map_err(|_| bad())?;
        let month: u32 = month.parse().map_err(|_| bad())?;

        PayPeriod::new(year, month).ok_or_else(bad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn month_bounds_are_inclusive() {
        let p = PayPeriod::new(2026, 8).unwrap();
        assert_eq!(p.month_start(), NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
        assert_eq!(p.month_end(), NaiveDate::from_ymd_opt(2026, 8, 31).unwrap());
    }

    #[test]
    fn december_rolls_into_next_year() {
        let p = PayPeriod::new(2025, 12).unwrap();
        assert_eq!(p.month_end(), NaiveDate::from_ymd_opt(2025, 12, 31).unwrap());
    }

    #[test]
    fn february_leap_year() {
        let p = PayPeriod::new(2024, 2).unwrap();
        assert_eq!(p.month_end(), NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
    }

    #[test]
    fn contains_checks_year_and_month() {
        let p = PayPeriod::new(2026, 8).unwrap();
        assert!(p.contains(NaiveDate::from_ymd_opt(2026, 8, 15).unwrap()));
        assert!(!p.contains(NaiveDate::from_ymd_opt(2025, 8, 15).unwrap()));
        assert!(!p.contains(NaiveDate::from_ymd_opt(2026, 9, 1).unwrap()));
    }

    #[test]
    fn parses_and_displays_yyyy_mm() {
        let p: PayPeriod = "2026-08".parse().unwrap();
        assert_eq!(p, PayPeriod::new(2026, 8).unwrap());
        assert_eq!(p.to_string(), "2026-08");
    }

    #[test]
    fn rejects_malformed_month() {
        assert!("2026".parse::<PayPeriod>().is_err());
        assert!("2026-13".parse::<PayPeriod>().is_err());
        assert!("2026-0".parse::<PayPeriod>().is_err());
        assert!("08-2026x".parse::<PayPeriod>().is_err());
    }

    #[test]
    fn containing_uses_calendar_month() {
        let date = NaiveDate::from_ymd_opt(2026, 8, 27).unwrap();
        assert_eq!(PayPeriod::containing(date), PayPeriod::new(2026, 8).unwrap());
    }
}
