//! Period resolution: symbolic period tokens to concrete date windows.
//!
//! A timesheet either uses a free period (caller-supplied `date_from` /
//! `date_to`) or a default period, where a token such as `current_week`
//! drives the bounds relative to today. All windows are inclusive.

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An inclusive date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateRange {
    pub const fn new(from: NaiveDate, to: NaiveDate) -> Self {
        Self { from, to }
    }

    /// A window covering a single day.
    pub const fn day(day: NaiveDate) -> Self {
        Self { from: day, to: day }
    }

    /// Returns true if `day` falls within the window.
    pub fn contains(&self, day: NaiveDate) -> bool {
        self.from <= day && day <= self.to
    }
}

/// Whether the date window is caller-supplied or token-driven.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PeriodType {
    /// `date_from` / `date_to` are fixed; period tokens are ignored.
    #[default]
    FreePeriod,
    /// A period token drives the window.
    Default,
}

impl PeriodType {
    /// Parses a period type option, falling back to [`PeriodType::FreePeriod`].
    ///
    /// Accepts the names `free` / `default` as well as the numeric codes
    /// `0` / `1` used by form submissions.
    pub fn parse_or_default(value: &str) -> Self {
        match value.trim() {
            "default" | "1" => Self::Default,
            _ => Self::FreePeriod,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::FreePeriod => "free",
            Self::Default => "default",
        }
    }
}

impl fmt::Display for PeriodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbolic period tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Period {
    Today,
    Yesterday,
    /// Monday through Sunday of the current week.
    CurrentWeek,
    /// Monday through Sunday of the previous week.
    LastWeek,
    SevenDays,
    CurrentMonth,
    LastMonth,
    ThirtyDays,
    CurrentYear,
    /// No date restriction.
    All,
}

/// Error for unrecognized period tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown period: {0}")]
pub struct UnknownPeriod(String);

impl Period {
    pub const ALL: [Self; 10] = [
        Self::Today,
        Self::Yesterday,
        Self::CurrentWeek,
        Self::LastWeek,
        Self::SevenDays,
        Self::CurrentMonth,
        Self::LastMonth,
        Self::ThirtyDays,
        Self::CurrentYear,
        Self::All,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Today => "today",
            Self::Yesterday => "yesterday",
            Self::CurrentWeek => "current_week",
            Self::LastWeek => "last_week",
            Self::SevenDays => "7_days",
            Self::CurrentMonth => "current_month",
            Self::LastMonth => "last_month",
            Self::ThirtyDays => "30_days",
            Self::CurrentYear => "current_year",
            Self::All => "all",
        }
    }

    /// Parses a token, returning `None` for anything unrecognized.
    pub fn parse_lenient(value: &str) -> Option<Self> {
        value.parse().ok()
    }

    /// The window this token denotes relative to `today`.
    ///
    /// Returns `None` for [`Period::All`], meaning unrestricted.
    pub fn range(self, today: NaiveDate) -> Option<DateRange> {
        let range = match self {
            Self::Today => DateRange::day(today),
            Self::Yesterday => DateRange::day(today - Duration::days(1)),
            Self::CurrentWeek => {
                let monday = week_start(today);
                DateRange::new(monday, monday + Duration::days(6))
            }
            Self::LastWeek => {
                let monday = week_start(today) - Duration::days(7);
                DateRange::new(monday, monday + Duration::days(6))
            }
            Self::SevenDays => DateRange::new(today - Duration::days(7), today),
            Self::CurrentMonth => DateRange::new(month_start(today), month_end(today)),
            Self::LastMonth => {
                let end = month_start(today) - Duration::days(1);
                DateRange::new(month_start(end), end)
            }
            Self::ThirtyDays => DateRange::new(today - Duration::days(30), today),
            Self::CurrentYear => DateRange::new(year_start(today), year_end(today)),
            Self::All => return None,
        };
        Some(range)
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = UnknownPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Self::ALL
            .into_iter()
            .find(|period| period.as_str() == token)
            .ok_or_else(|| UnknownPeriod(s.to_string()))
    }
}

/// Resolves the date window for a timesheet.
///
/// Free periods and unrecognized tokens (`period == None`) leave `current`
/// untouched.
pub fn resolve(
    period_type: PeriodType,
    period: Option<Period>,
    current: Option<DateRange>,
    today: NaiveDate,
) -> Option<DateRange> {
    match (period_type, period) {
        (PeriodType::FreePeriod, _) | (PeriodType::Default, None) => current,
        (PeriodType::Default, Some(period)) => period.range(today),
    }
}

fn week_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

fn month_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.day0()))
}

fn month_end(day: NaiveDate) -> NaiveDate {
    // Day 32 of any month lands in the following month.
    month_start(month_start(day) + Duration::days(32)) - Duration::days(1)
}

fn year_start(day: NaiveDate) -> NaiveDate {
    day - Duration::days(i64::from(day.ordinal0()))
}

fn year_end(day: NaiveDate) -> NaiveDate {
    year_start(year_start(day) + Duration::days(366)) - Duration::days(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Weekday;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn range(from: NaiveDate, to: NaiveDate) -> Option<DateRange> {
        Some(DateRange::new(from, to))
    }

    // Jan 29, 2025 is a Wednesday
    fn wednesday() -> NaiveDate {
        date(2025, 1, 29)
    }

    #[test]
    fn today_and_yesterday() {
        let today = wednesday();
        assert_eq!(Period::Today.range(today), Some(DateRange::day(today)));
        assert_eq!(
            Period::Yesterday.range(today),
            Some(DateRange::day(date(2025, 1, 28)))
        );
    }

    #[test]
    fn current_week_is_monday_to_sunday_for_every_weekday() {
        for offset in 0..7 {
            let today = date(2025, 1, 27) + Duration::days(offset);
            let week = Period::CurrentWeek.range(today).unwrap();
            assert_eq!(week.from.weekday(), Weekday::Mon, "today = {today}");
            assert_eq!(week.to.weekday(), Weekday::Sun, "today = {today}");
            assert_eq!(week.from, date(2025, 1, 27));
            assert_eq!(week.to, date(2025, 2, 2));
        }
    }

    #[test]
    fn last_week_ends_the_day_before_current_week() {
        let today = wednesday();
        assert_eq!(
            Period::LastWeek.range(today),
            range(date(2025, 1, 20), date(2025, 1, 26))
        );
    }

    #[test]
    fn rolling_windows() {
        let today = wednesday();
        assert_eq!(
            Period::SevenDays.range(today),
            range(date(2025, 1, 22), today)
        );
        assert_eq!(
            Period::ThirtyDays.range(today),
            range(date(2024, 12, 30), today)
        );
    }

    #[test]
    fn month_windows() {
        let today = wednesday();
        assert_eq!(
            Period::CurrentMonth.range(today),
            range(date(2025, 1, 1), date(2025, 1, 31))
        );
        assert_eq!(
            Period::LastMonth.range(today),
            range(date(2024, 12, 1), date(2024, 12, 31))
        );
    }

    #[test]
    fn month_windows_handle_leap_february() {
        assert_eq!(
            Period::CurrentMonth.range(date(2024, 2, 10)),
            range(date(2024, 2, 1), date(2024, 2, 29))
        );
        assert_eq!(
            Period::LastMonth.range(date(2024, 3, 31)),
            range(date(2024, 2, 1), date(2024, 2, 29))
        );
    }

    #[test]
    fn current_year_window() {
        assert_eq!(
            Period::CurrentYear.range(wednesday()),
            range(date(2025, 1, 1), date(2025, 12, 31))
        );
        assert_eq!(
            Period::CurrentYear.range(date(2024, 12, 31)),
            range(date(2024, 1, 1), date(2024, 12, 31))
        );
    }

    #[test]
    fn all_clears_bounds() {
        let current = range(date(2025, 1, 1), date(2025, 1, 2));
        assert_eq!(
            resolve(PeriodType::Default, Some(Period::All), current, wednesday()),
            None
        );
    }

    #[test]
    fn free_period_ignores_every_token() {
        let current = range(date(2024, 6, 1), date(2024, 6, 30));
        for period in Period::ALL {
            assert_eq!(
                resolve(PeriodType::FreePeriod, Some(period), current, wednesday()),
                current,
                "period = {period}"
            );
        }
    }

    #[test]
    fn unknown_token_leaves_bounds_unchanged() {
        let current = range(date(2024, 6, 1), date(2024, 6, 30));
        let period = Period::parse_lenient("fortnight");
        assert_eq!(period, None);
        assert_eq!(
            resolve(PeriodType::Default, period, current, wednesday()),
            current
        );
    }

    #[test]
    fn tokens_roundtrip_through_display() {
        for period in Period::ALL {
            assert_eq!(period.to_string().parse::<Period>().unwrap(), period);
        }
        assert!("weekly".parse::<Period>().is_err());
    }

    #[test]
    fn period_type_parse_falls_back_to_free() {
        assert_eq!(PeriodType::parse_or_default("default"), PeriodType::Default);
        assert_eq!(PeriodType::parse_or_default("1"), PeriodType::Default);
        assert_eq!(PeriodType::parse_or_default("0"), PeriodType::FreePeriod);
        assert_eq!(PeriodType::parse_or_default("free"), PeriodType::FreePeriod);
        assert_eq!(PeriodType::parse_or_default("7"), PeriodType::FreePeriod);
    }

    #[test]
    fn date_range_contains_is_inclusive() {
        let window = DateRange::new(date(2025, 1, 1), date(2025, 1, 3));
        assert!(window.contains(date(2025, 1, 1)));
        assert!(window.contains(date(2025, 1, 3)));
        assert!(!window.contains(date(2025, 1, 4)));
    }
}
