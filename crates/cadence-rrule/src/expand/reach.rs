//! Reachability of filters under stepping.
//!
//! A filter set can pass range validation and still never produce an
//! occurrence: the filters may never hold on the same day, or the cursor may
//! only ever visit every n-th month, weekday or hour. A rule bounded by a
//! count would then iterate forever, so the builder rejects these up front.
//!
//! The Gregorian calendar repeats exactly every 400 years (146 097 days,
//! 20 871 weeks), which bounds every search here.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Timelike};

use super::filter::{self, FilterContext};
use crate::model::{Frequency, RecurrenceRule, Weekday};

const CYCLE_START_YEAR: i32 = 2000;
const CYCLE_DAYS: usize = 146_097;
const SECONDS_PER_DAY: u64 = 86_400;
const SECONDS_PER_WEEK: u64 = 7 * SECONDS_PER_DAY;

/// Number of `frequency` units in one 400-year calendar cycle.
const fn cycle_units(frequency: Frequency) -> u64 {
    match frequency {
        Frequency::Yearly => 400,
        Frequency::Monthly => 4_800,
        Frequency::Weekly => 20_871,
        Frequency::Daily => 146_097,
        Frequency::Hourly => 146_097 * 24,
        Frequency::Minutely => 146_097 * 24 * 60,
        Frequency::Secondly => 146_097 * SECONDS_PER_DAY,
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a
}

/// ## Summary
/// Number of consecutive periods after which a rule's cursor lands on the
/// same calendar position again, shifted by a whole 400-year cycle.
///
/// If that many periods in a row produce nothing, no later period can.
pub(crate) fn cycle_periods(rule: &RecurrenceRule) -> u64 {
    let units = cycle_units(rule.frequency());
    units / gcd(u64::from(rule.interval()), units)
}

/// Months (1-12) the cursor of a monthly rule can land on; every month for
/// other frequencies.
fn reachable_months(rule: &RecurrenceRule) -> [bool; 12] {
    if rule.frequency() != Frequency::Monthly {
        return [true; 12];
    }
    let stride = gcd(u64::from(rule.interval()), 12);
    let start = u64::from(rule.anchor().month0());
    let mut months = [false; 12];
    for (month0, slot) in (0_u64..).zip(months.iter_mut()) {
        *slot = (month0 + 12 - start) % stride == 0;
    }
    months
}

fn month_reachable(months: &[bool; 12], month: u32) -> bool {
    usize::try_from(month)
        .ok()
        .and_then(|m| m.checked_sub(1))
        .and_then(|i| months.get(i))
        .copied()
        .unwrap_or(false)
}

/// Whether a monthly rule's cursor ever reaches a month of the month filter.
pub(crate) fn months_reachable(rule: &RecurrenceRule) -> bool {
    let reachable = reachable_months(rule);
    rule.filters()
        .months()
        .is_none_or(|months| months.iter().any(|&m| month_reachable(&reachable, m)))
}

/// ## Summary
/// Whether some day of a full calendar cycle, in a month the cursor can
/// reach, passes every date filter at once.
pub(crate) fn date_filters_satisfiable(rule: &RecurrenceRule) -> bool {
    let context = FilterContext {
        scope: rule.ordinal_scope(),
        week_start: rule.week_start(),
    };
    let months = reachable_months(rule);
    let Some(first) = NaiveDate::from_yo_opt(CYCLE_START_YEAR, 1) else {
        return true;
    };
    first.iter_days().take(CYCLE_DAYS).any(|day| {
        month_reachable(&months, day.month()) && filter::matches_date(day, rule.filters(), context)
    })
}

/// ## Summary
/// Whether the weekday and time of day that a daily or finer rule keeps from
/// its cursor can ever satisfy the weekday, hour, minute and second filters.
///
/// Cursor positions within a week form the residues of
/// `anchor + k * interval` modulo one week, which are exactly the multiples
/// of `gcd(step, week)` offset from the anchor.
pub(crate) fn cursor_time_reachable(rule: &RecurrenceRule) -> bool {
    let frequency = rule.frequency();
    let unit = match frequency {
        Frequency::Daily => SECONDS_PER_DAY,
        Frequency::Hourly => 3_600,
        Frequency::Minutely => 60,
        Frequency::Secondly => 1,
        Frequency::Weekly | Frequency::Monthly | Frequency::Yearly => return true,
    };

    let anchor = rule.anchor();
    let start = u64::from(Weekday::from(anchor.weekday()).index()) * SECONDS_PER_DAY
        + u64::from(anchor.num_seconds_from_midnight());
    let step = (u64::from(rule.interval()) * unit) % SECONDS_PER_WEEK;
    let stride = gcd(step, SECONDS_PER_WEEK);

    (0..SECONDS_PER_WEEK / stride)
        .any(|j| position_matches(rule, (start + j * stride) % SECONDS_PER_WEEK))
}

/// Checks a position, in seconds into a Monday-started week, against the
/// filters the cursor itself has to satisfy at the rule's frequency.
fn position_matches(rule: &RecurrenceRule, position: u64) -> bool {
    let frequency = rule.frequency();
    let filters = rule.filters();
    let Some(weekday) = usize::try_from(position / SECONDS_PER_DAY)
        .ok()
        .and_then(|i| Weekday::all().get(i).copied())
    else {
        return false;
    };
    let second_of_day = position % SECONDS_PER_DAY;
    let (hour, minute, second) = (
        second_of_day / 3_600,
        second_of_day / 60 % 60,
        second_of_day % 60,
    );
    let contains = |values: Option<&BTreeSet<u32>>, value: u64| {
        values.is_none_or(|values| {
            u32::try_from(value).is_ok_and(|value| values.contains(&value))
        })
    };

    filters
        .weekdays()
        .is_none_or(|days| days.iter().any(|wd| wd.day() == weekday))
        && (frequency > Frequency::Hourly || contains(filters.hours(), hour))
        && (frequency > Frequency::Minutely || contains(filters.minutes(), minute))
        && (frequency > Frequency::Secondly || contains(filters.seconds(), second))
}
