//! Calendar arithmetic shared by fiscal periods and recurring schedules.
//!
//! All functions return `None` instead of panicking when a date falls
//! outside chrono's representable range.

use chrono::{Datelike, Months, NaiveDate};

/// Number of days in the given month.
#[must_use]
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = first.checked_add_months(Months::new(1))?;
    u32::try_from(next.signed_duration_since(first).num_days()).ok()
}

/// Last calendar day of the month containing `date`.
#[must_use]
pub fn end_of_month(date: NaiveDate) -> Option<NaiveDate> {
    let last = days_in_month(date.year(), date.month())?;
    date.with_day(last)
}

/// Builds a date, clamping `day` to the last day of the month.
#[must_use]
pub fn with_day_clamped(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let last = days_in_month(year, month)?;
    NaiveDate::from_ymd_opt(year, month, day.clamp(1, last))
}

/// Moves `date` forward by `months`, landing on `pin_day` (or the original
/// day of month) clamped to the target month's length.
///
/// The pin is applied against the target month every time, so a clamped
/// date never drifts: Jan 31 → Feb 29/28 → Mar 31 with `pin_day = 31`.
#[must_use]
pub fn shift_months(date: NaiveDate, months: u32, pin_day: Option<u32>) -> Option<NaiveDate> {
    let first = date.with_day(1)?;
    let target = first.checked_add_months(Months::new(months))?;
    with_day_clamped(target.year(), target.month(), pin_day.unwrap_or(date.day()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[rstest]
    #[case(2024, 2, 29)]
    #[case(2023, 2, 28)]
    #[case(2024, 4, 30)]
    #[case(2024, 12, 31)]
    fn test_days_in_month(#[case] year: i32, #[case] month: u32, #[case] expected: u32) {
        assert_eq!(days_in_month(year, month), Some(expected));
    }

    #[test]
    fn test_end_of_month() {
        assert_eq!(end_of_month(d(2024, 2, 10)), Some(d(2024, 2, 29)));
    }

    #[rstest]
    #[case(d(2024, 1, 31), 1, Some(31), d(2024, 2, 29))]
    #[case(d(2024, 2, 29), 1, Some(31), d(2024, 3, 31))]
    #[case(d(2024, 3, 31), 1, Some(31), d(2024, 4, 30))]
    #[case(d(2024, 1, 31), 1, None, d(2024, 2, 29))]
    #[case(d(2024, 2, 29), 1, None, d(2024, 3, 29))]
    #[case(d(2024, 11, 15), 3, Some(15), d(2025, 2, 15))]
    #[case(d(2024, 2, 29), 12, None, d(2025, 2, 28))]
    fn test_shift_months(
        #[case] from: NaiveDate,
        #[case] months: u32,
        #[case] pin: Option<u32>,
        #[case] expected: NaiveDate,
    ) {
        assert_eq!(shift_months(from, months, pin), Some(expected));
    }
}
