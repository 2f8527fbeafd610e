//! Calendar arithmetic shared by the holding valuations
//!
//! Monthly schedules are anchored on a day of the month and clamped to the
//! last day of shorter months. Year fractions use an actual/365 day count.

use chrono::{Datelike, Months, NaiveDate};

/// Day count denominator for year fractions (actual/365)
pub const DAYS_PER_YEAR: f64 = 365.0;

/// Number of days in the given month
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(31)
}

/// Occurrence of a day-of-month anchor in the given month.
/// Anchors past the end of the month land on its last day.
pub fn anchored_day(year: i32, month: u32, anchor: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, anchor.min(days_in_month(year, month)))
}

/// All monthly occurrences of `anchor` within `[from, to]`, in date order.
///
/// Walks calendar months from the month of `from` through the month of `to`;
/// an inverted bound yields nothing.
pub fn monthly_occurrences(
    anchor: u32,
    from: NaiveDate,
    to: NaiveDate,
) -> impl Iterator<Item = NaiveDate> {
    let first_month = if from <= to { from.with_day(1) } else { None };

    std::iter::successors(first_month, |month| month.checked_add_months(Months::new(1)))
        .take_while(move |month| *month <= to)
        .filter_map(move |month| anchored_day(month.year(), month.month(), anchor))
        .filter(move |day| *day >= from && *day <= to)
}

/// Signed year fraction between two dates (actual/365)
pub fn year_fraction(from: NaiveDate, to: NaiveDate) -> f64 {
    (to - from).num_days() as f64 / DAYS_PER_YEAR
}

/// Every calendar day in `[start, end]`, empty when `start > end`
pub fn days_between(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|day| *day <= end).collect()
}
