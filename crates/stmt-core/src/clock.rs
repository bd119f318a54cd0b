//! Source of "today" for date normalization.

use chrono::{Datelike, Local, NaiveDate};

/// Supplies the current processing date.
///
/// Partial dates borrow the current year from the clock, and unparseable
/// dates fall back to its current day.
pub trait Clock {
    /// The current calendar date.
    fn today(&self) -> NaiveDate;

    /// The current calendar year.
    fn current_year(&self) -> i32 {
        self.today().year()
    }
}

/// Wall clock in the local time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock pinned to one date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl FixedClock {
    /// Pin the clock to `year-month-day`, or `None` if that is not a date.
    pub fn ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }
}

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn today(&self) -> NaiveDate {
        (**self).today()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_clock() {
        let clock = FixedClock::ymd(2025, 3, 1).unwrap();
        assert_eq!(clock.today(), NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
        assert_eq!(clock.current_year(), 2025);
    }

    #[test]
    fn test_fixed_clock_rejects_invalid() {
        assert!(FixedClock::ymd(2025, 2, 29).is_none());
    }
}
