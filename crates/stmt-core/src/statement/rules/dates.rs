//! Date normalization for statement date tokens.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::patterns::BARE_DATE;
use crate::clock::Clock;

/// Component order of a numeric date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateOrder {
    MonthFirst,
    DayFirst,
    YearFirst,
}

/// One numeric date layout, e.g. `MM/DD/YYYY`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateFormat {
    pub order: DateOrder,
    pub separator: char,
    pub year_digits: usize,
}

const fn fmt(order: DateOrder, separator: char, year_digits: usize) -> DateFormat {
    DateFormat { order, separator, year_digits }
}

/// Formats tried in order; the first one that yields a real calendar date
/// wins. US month-first layouts come before day-first ones.
pub const DATE_FORMATS: [DateFormat; 10] = [
    fmt(DateOrder::MonthFirst, '/', 4),
    fmt(DateOrder::MonthFirst, '/', 2),
    fmt(DateOrder::DayFirst, '/', 4),
    fmt(DateOrder::DayFirst, '/', 2),
    fmt(DateOrder::MonthFirst, '-', 4),
    fmt(DateOrder::MonthFirst, '-', 2),
    fmt(DateOrder::DayFirst, '-', 4),
    fmt(DateOrder::DayFirst, '-', 2),
    fmt(DateOrder::YearFirst, '-', 4),
    fmt(DateOrder::YearFirst, '-', 2),
];

impl DateFormat {
    /// Parse `token` strictly in this layout.
    pub fn parse(&self, token: &str) -> Option<NaiveDate> {
        let parts: Vec<&str> = token.split(self.separator).collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty() || !p.bytes().all(|b| b.is_ascii_digit())) {
            return None;
        }

        let (y, m, d) = match self.order {
            DateOrder::MonthFirst => (parts[2], parts[0], parts[1]),
            DateOrder::DayFirst => (parts[2], parts[1], parts[0]),
            DateOrder::YearFirst => (parts[0], parts[1], parts[2]),
        };

        if y.len() != self.year_digits || m.len() > 2 || d.len() > 2 {
            return None;
        }

        let year = expand_year(y.parse().ok()?, self.year_digits);
        NaiveDate::from_ymd_opt(year, m.parse().ok()?, d.parse().ok()?)
    }

    /// Human-readable layout, e.g. `DD-MM-YY`.
    pub fn pattern(&self) -> String {
        let year = "Y".repeat(self.year_digits);
        let year = year.as_str();
        let sep = self.separator.to_string();
        let parts: [&str; 3] = match self.order {
            DateOrder::MonthFirst => ["MM", "DD", year],
            DateOrder::DayFirst => ["DD", "MM", year],
            DateOrder::YearFirst => [year, "MM", "DD"],
        };
        parts.join(sep.as_str())
    }
}

/// Two-digit years 69-99 are 19xx, 00-68 are 20xx.
fn expand_year(year: i32, digits: usize) -> i32 {
    if digits != 2 {
        year
    } else if year >= 69 {
        1900 + year
    } else {
        2000 + year
    }
}

/// How a normalized date was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateSource {
    /// The token parsed as written.
    Parsed,
    /// The token had no year; the clock's current year was used.
    YearInferred,
    /// Nothing parsed; the clock's current day was used.
    FallbackToToday,
}

/// Result of normalizing a date token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NormalizedDate {
    pub date: NaiveDate,
    pub source: DateSource,
    /// Layout that matched, if any.
    pub format: Option<DateFormat>,
}

impl NormalizedDate {
    pub fn is_fallback(&self) -> bool {
        self.source == DateSource::FallbackToToday
    }
}

/// Normalize a statement date token into a calendar date.
///
/// Never fails: a token no layout accepts resolves to `clock.today()` and is
/// marked [`DateSource::FallbackToToday`].
pub fn normalize_date(token: &str, clock: &impl Clock) -> NormalizedDate {
    let token = token.trim();

    let (candidate, year_inferred) = match BARE_DATE.captures(token) {
        Some(caps) => (
            format!("{}{}{}{}{}", &caps[1], &caps[2], &caps[3], &caps[2], clock.current_year()),
            true,
        ),
        None => (token.to_string(), false),
    };

    for format in DATE_FORMATS.iter() {
        if let Some(date) = format.parse(&candidate) {
            let source = if year_inferred {
                debug!("Date {:?} has no year, using {}", token, date);
                DateSource::YearInferred
            } else {
                DateSource::Parsed
            };
            return NormalizedDate { date, source, format: Some(*format) };
        }
    }

    let today = clock.today();
    warn!("Could not parse date {:?}, falling back to {}", token, today);
    NormalizedDate {
        date: today,
        source: DateSource::FallbackToToday,
        format: None,
    }
}

/// Parse a date cell from tabular input.
///
/// Accepts the statement layouts plus ISO datetimes and month-name forms;
/// returns `None` instead of falling back.
pub fn parse_calendar_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Some(date) = DATE_FORMATS.iter().find_map(|f| f.parse(s)) {
        return Some(date);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    for layout in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M", "%m/%d/%Y %H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, layout) {
            return Some(dt.date());
        }
    }

    for layout in ["%Y/%m/%d", "%b %d, %Y", "%B %d, %Y", "%d %b %Y", "%d %B %Y", "%b %d %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(s, layout) {
            return Some(date);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use pretty_assertions::assert_eq;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock::ymd(2025, 6, 30).unwrap()
    }

    #[test]
    fn test_month_first_wins() {
        let n = normalize_date("01/15/2024", &clock());
        assert_eq!(n.date, ymd(2024, 1, 15));
        assert_eq!(n.source, DateSource::Parsed);
        assert_eq!(n.format.unwrap().pattern(), "MM/DD/YYYY");

        // Ambiguous: month-first is preferred.
        assert_eq!(normalize_date("03/04/2024", &clock()).date, ymd(2024, 3, 4));
    }

    #[test]
    fn test_day_first_when_month_invalid() {
        let n = normalize_date("15/01/2024", &clock());
        assert_eq!(n.date, ymd(2024, 1, 15));
        assert_eq!(n.format.unwrap().pattern(), "DD/MM/YYYY");
    }

    #[test]
    fn test_two_digit_years() {
        assert_eq!(normalize_date("1/5/24", &clock()).date, ymd(2024, 1, 5));
        assert_eq!(normalize_date("1/5/99", &clock()).date, ymd(1999, 1, 5));
        assert_eq!(normalize_date("12-31-68", &clock()).date, ymd(2068, 12, 31));
    }

    #[test]
    fn test_iso_date() {
        let n = normalize_date("2024-01-15", &clock());
        assert_eq!(n.date, ymd(2024, 1, 15));
        assert_eq!(n.format.unwrap().pattern(), "YYYY-MM-DD");
    }

    #[test]
    fn test_bare_date_uses_current_year() {
        let n = normalize_date("01/16", &clock());
        assert_eq!(n.date, ymd(2025, 1, 16));
        assert_eq!(n.source, DateSource::YearInferred);

        let n = normalize_date("7-4", &clock());
        assert_eq!(n.date, ymd(2025, 7, 4));
    }

    #[test]
    fn test_feb_29_in_non_leap_year_is_flagged() {
        let n = normalize_date("02/29", &clock());
        assert!(n.is_fallback());
        assert_eq!(n.date, ymd(2025, 6, 30));
    }

    #[test]
    fn test_feb_29_in_leap_year() {
        let leap = FixedClock::ymd(2024, 3, 1).unwrap();
        let n = normalize_date("02/29", &leap);
        assert_eq!(n.date, ymd(2024, 2, 29));
        assert_eq!(n.source, DateSource::YearInferred);
    }

    #[test]
    fn test_mixed_separators_fall_back() {
        assert!(normalize_date("01/15-2024", &clock()).is_fallback());
        assert!(normalize_date("13/13/2024", &clock()).is_fallback());
    }

    #[test]
    fn test_parse_calendar_date() {
        assert_eq!(parse_calendar_date("2024-01-15"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_calendar_date("01/15/2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_calendar_date("2024-01-15 00:00:00"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_calendar_date("2024-01-15T10:30:00Z"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_calendar_date("Jan 15, 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_calendar_date("15 January 2024"), Some(ymd(2024, 1, 15)));
        assert_eq!(parse_calendar_date("not a date"), None);
        assert_eq!(parse_calendar_date(""), None);
    }
}
