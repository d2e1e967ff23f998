//! Calendar arithmetic for advancing a cursor by whole frequency units.
//!
//! Fixed-length units (weeks down to seconds) are plain duration addition.
//! Months and years are calendar units: the day of month is kept when the
//! target month has it and clamped to the month's last day otherwise, so
//! Jan 31 + 1 month is Feb 28 (or 29) and Feb 29 + 1 year is Feb 28.
//!
//! Every function returns `None` only when the result would leave chrono's
//! representable range.

use chrono::{Datelike, NaiveDate, NaiveDateTime, TimeDelta};

use crate::model::Frequency;

/// Whether `year` is a Gregorian leap year.
#[must_use]
pub const fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

/// Number of days in `month` (1-12) of `year`.
#[must_use]
pub const fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        2 if is_leap_year(year) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}

/// Longest length `month` (1-12) can have in any year.
#[must_use]
pub const fn max_days_in_month(month: u32) -> u32 {
    days_in_month(2000, month)
}

/// Number of days in `year`.
#[must_use]
pub const fn days_in_year(year: i32) -> u32 {
    if is_leap_year(year) { 366 } else { 365 }
}

/// Builds a date, clamping `day` down to the last day of the month.
#[must_use]
pub fn clamped_date(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day.min(days_in_month(year, month)))
}

/// Adds `months` calendar months, clamping the day of month.
#[must_use]
pub fn add_months(dt: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let total = i64::from(dt.year())
        .checked_mul(12)?
        .checked_add(i64::from(dt.month0()))?
        .checked_add(months)?;
    let year = i32::try_from(total.div_euclid(12)).ok()?;
    let month = u32::try_from(total.rem_euclid(12)).ok()? + 1;

    clamped_date(year, month, dt.day()).map(|date| date.and_time(dt.time()))
}

/// Adds `years` calendar years, clamping Feb 29 to Feb 28 in common years.
#[must_use]
pub fn add_years(dt: NaiveDateTime, years: i64) -> Option<NaiveDateTime> {
    add_months(dt, years.checked_mul(12)?)
}

/// ## Summary
/// Advances `start` by `units` of `frequency`.
///
/// The iterator always advances from the rule's anchor by `k * interval`
/// units rather than chaining single steps, so a clamped day never feeds
/// into the next step: a Jan 31 anchor yields Jan 31, Feb 29, Mar 31.
#[must_use]
pub fn advance(start: NaiveDateTime, frequency: Frequency, units: i64) -> Option<NaiveDateTime> {
    let delta = match frequency {
        Frequency::Yearly => return add_years(start, units),
        Frequency::Monthly => return add_months(start, units),
        Frequency::Weekly => TimeDelta::try_weeks(units)?,
        Frequency::Daily => TimeDelta::try_days(units)?,
        Frequency::Hourly => TimeDelta::try_hours(units)?,
        Frequency::Minutely => TimeDelta::try_minutes(units)?,
        Frequency::Secondly => TimeDelta::try_seconds(units)?,
    };
    start.checked_add_signed(delta)
}

/// Advances `start` by exactly one step of `interval` units of `frequency`.
#[must_use]
pub fn step(start: NaiveDateTime, frequency: Frequency, interval: u32) -> Option<NaiveDateTime> {
    advance(start, frequency, i64::from(interval))
}
