//! BY-rule constraint evaluation.
//!
//! A candidate passes when it satisfies every present filter kind (AND)
//! by matching at least one value of that kind (OR). Absent kinds impose
//! nothing.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Timelike};

use super::stepper::{days_in_month, days_in_year};
use crate::model::{Filters, Weekday, WeekdayRef};

/// Period in which weekday ordinals are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OrdinalScope {
    Month,
    Year,
}

impl fmt::Display for OrdinalScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Month => "month",
            Self::Year => "year",
        })
    }
}

/// Rule-level settings that date filters depend on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterContext {
    pub scope: OrdinalScope,
    pub week_start: Weekday,
}

/// ## Summary
/// Whether `candidate` satisfies every filter in `filters`.
#[must_use]
pub fn matches(candidate: NaiveDateTime, filters: &Filters, context: FilterContext) -> bool {
    matches_date(candidate.date(), filters, context) && matches_time(candidate.time(), filters)
}

/// Whether `date` satisfies the month, month-day, weekday, year-day and
/// week-number filters.
#[must_use]
pub fn matches_date(date: NaiveDate, filters: &Filters, context: FilterContext) -> bool {
    filters.months().is_none_or(|months| months.contains(&date.month()))
        && filters
            .month_days()
            .is_none_or(|days| month_day_matches(date, days))
        && filters
            .weekdays()
            .is_none_or(|days| days.iter().any(|wd| weekday_matches(date, *wd, context.scope)))
        && filters
            .year_days()
            .is_none_or(|days| year_day_matches(date, days))
        && filters
            .week_numbers()
            .is_none_or(|weeks| week_number_matches(date, weeks, context.week_start))
}

/// Whether `time` satisfies the hour, minute and second filters.
#[must_use]
pub fn matches_time(time: NaiveTime, filters: &Filters) -> bool {
    filters.hours().is_none_or(|hours| hours.contains(&time.hour()))
        && filters
            .minutes()
            .is_none_or(|minutes| minutes.contains(&time.minute()))
        && filters
            .seconds()
            .is_none_or(|seconds| seconds.contains(&time.second()))
}

/// Resolves a 1-based position that may count from the end (`-1` = last)
/// against a period of `len` slots and compares it with `position`.
fn signed_position_matches(signed: i32, position: u32, len: u32) -> bool {
    let signed = i64::from(signed);
    let resolved = if signed > 0 {
        signed
    } else {
        i64::from(len) + signed + 1
    };
    resolved == i64::from(position)
}

fn month_day_matches(date: NaiveDate, days: &BTreeSet<i32>) -> bool {
    let len = days_in_month(date.year(), date.month());
    days.iter()
        .any(|&day| signed_position_matches(day, date.day(), len))
}

fn year_day_matches(date: NaiveDate, days: &BTreeSet<i32>) -> bool {
    let len = days_in_year(date.year());
    days.iter()
        .any(|&day| signed_position_matches(day, date.ordinal(), len))
}

fn weekday_matches(date: NaiveDate, weekday: WeekdayRef, scope: OrdinalScope) -> bool {
    if Weekday::from(date.weekday()) != weekday.day() {
        return false;
    }
    let Some(ordinal) = weekday.ordinal() else {
        return true;
    };

    let (position, len) = match scope {
        OrdinalScope::Month => (date.day(), days_in_month(date.year(), date.month())),
        OrdinalScope::Year => (date.ordinal(), days_in_year(date.year())),
    };
    let from_start = (position - 1) / 7 + 1;
    let from_end = (len - position) / 7 + 1;
    let ordinal = i64::from(ordinal);
    ordinal == i64::from(from_start) || ordinal == -i64::from(from_end)
}

fn week_number_matches(date: NaiveDate, weeks: &BTreeSet<i32>, week_start: Weekday) -> bool {
    let Some(week) = week_number(date, week_start) else {
        return false;
    };
    weeks
        .iter()
        .any(|&n| signed_position_matches(n, week.number, week.weeks_in_year))
}

/// Position of a date in its week-numbering year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WeekNumber {
    /// Week-numbering year the date belongs to.
    pub year: i32,
    /// 1-based week number within `year`.
    pub number: u32,
    /// Number of weeks in `year` (52 or 53).
    pub weeks_in_year: u32,
}

/// ## Summary
/// Computes the week number of `date` with weeks starting on `week_start`.
///
/// Week 1 is the first week with at least four days in the calendar year,
/// so the first days of January may belong to the previous year's last week
/// and the last days of December to the next year's week 1. With a Monday
/// week start this is ISO 8601 week numbering.
#[must_use]
pub fn week_number(date: NaiveDate, week_start: Weekday) -> Option<WeekNumber> {
    let mut year = date.year();
    let mut start = first_week_start(year, week_start)?;
    if date < start {
        year -= 1;
        start = first_week_start(year, week_start)?;
    } else {
        let next = first_week_start(year + 1, week_start)?;
        if date >= next {
            year += 1;
            start = next;
        }
    }
    let next_start = first_week_start(year + 1, week_start)?;

    let number = u32::try_from((date - start).num_days() / 7).ok()? + 1;
    let weeks_in_year = u32::try_from((next_start - start).num_days() / 7).ok()?;
    Some(WeekNumber {
        year,
        number,
        weeks_in_year,
    })
}

/// First day of week 1 of `year`.
fn first_week_start(year: i32, week_start: Weekday) -> Option<NaiveDate> {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let offset = i64::from(Weekday::from(jan1.weekday()).days_since(week_start));
    let week_containing_jan1 = jan1.checked_sub_signed(TimeDelta::try_days(offset)?)?;
    if 7 - offset >= 4 {
        Some(week_containing_jan1)
    } else {
        week_containing_jan1.checked_add_signed(TimeDelta::try_days(7)?)
    }
}
