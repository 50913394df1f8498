//! Expected working hours over a date window.

use chrono::Datelike;

use crate::period::DateRange;

/// Hours expected per working day.
pub const WORKING_HOURS: f64 = 7.5;

/// Counts Monday-to-Friday days in the inclusive window.
///
/// An inverted window (`from > to`) contains no weekdays.
pub fn weekday_count(range: DateRange) -> i64 {
    if range.from > range.to {
        return 0;
    }
    let days = (range.to - range.from).num_days() + 1;
    let start = i64::from(range.from.weekday().num_days_from_monday());
    let remainder = (0..days % 7)
        .filter(|offset| (start + offset) % 7 < 5)
        .count();
    (days / 7) * 5 + i64::try_from(remainder).unwrap_or_default()
}

/// Expected hours for one user over the window, or `None` when unbounded.
#[allow(clippy::cast_precision_loss)]
pub fn quota(range: Option<DateRange>) -> Option<f64> {
    range.map(|range| weekday_count(range) as f64 * WORKING_HOURS)
}

/// Expected hours for `user_count` users.
#[allow(clippy::cast_precision_loss)]
pub fn required(quota: Option<f64>, user_count: usize) -> Option<f64> {
    quota.map(|quota| quota * user_count as f64)
}

#[cfg(test)]
#[expect(
    clippy::float_cmp,
    reason = "quota values are exact multiples of 7.5"
)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn window(from: NaiveDate, to: NaiveDate) -> Option<DateRange> {
        Some(DateRange::new(from, to))
    }

    // Jan 27, 2025 is a Monday
    #[test]
    fn monday_to_friday_is_a_full_week() {
        assert_eq!(quota(window(date(2025, 1, 27), date(2025, 1, 31))), Some(37.5));
    }

    #[test]
    fn weekend_has_no_quota() {
        assert_eq!(quota(window(date(2025, 2, 1), date(2025, 2, 2))), Some(0.0));
    }

    #[test]
    fn single_weekday_counts_once() {
        assert_eq!(quota(window(date(2025, 1, 29), date(2025, 1, 29))), Some(7.5));
    }

    #[test]
    fn window_ending_on_saturday_excludes_it() {
        // Thu, Fri, Sat
        assert_eq!(quota(window(date(2025, 1, 30), date(2025, 2, 1))), Some(15.0));
    }

    #[test]
    fn inverted_window_is_zero() {
        assert_eq!(weekday_count(DateRange::new(date(2025, 1, 31), date(2025, 1, 27))), 0);
        assert_eq!(quota(window(date(2025, 1, 31), date(2025, 1, 27))), Some(0.0));
    }

    #[test]
    fn unbounded_window_has_no_quota() {
        assert_eq!(quota(None), None);
        assert_eq!(required(None, 4), None);
    }

    #[test]
    fn closed_form_matches_day_by_day_count() {
        let start = date(2024, 12, 18);
        for len in 0..60 {
            for shift in 0..7 {
                let from = start + Duration::days(shift);
                let to = from + Duration::days(len);
                let mut expected = 0;
                let mut day = from;
                while day <= to {
                    if day.weekday().num_days_from_monday() < 5 {
                        expected += 1;
                    }
                    day += Duration::days(1);
                }
                assert_eq!(
                    weekday_count(DateRange::new(from, to)),
                    expected,
                    "{from}..{to}"
                );
            }
        }
    }

    #[test]
    fn required_scales_by_user_count() {
        let quota = quota(window(date(2025, 1, 27), date(2025, 1, 31)));
        assert_eq!(required(quota, 3), Some(112.5));
        assert_eq!(required(quota, 0), Some(0.0));
    }
}
