//! Candidate enumeration within one frequency period.
//!
//! Stepping the cursor alone only ever visits the anchor's own weekday, day
//! of month and time of day. Filters that name finer units than the
//! frequency (weekdays inside a week, month days inside a month, minutes
//! inside an hour) therefore expand the period into all of its matching
//! slots before the filter predicate has the final word.

use std::collections::BTreeSet;

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use super::filter::{self, FilterContext};
use super::stepper::{clamped_date, days_in_month, days_in_year};
use crate::model::{Frequency, RecurrenceRule, Weekday};

/// ## Summary
/// Returns the sorted occurrences of the period that starts stepping at
/// `cursor`.
///
/// Candidates before the anchor or after an `Until` bound are not removed
/// here; the iterator decides termination.
pub(crate) fn candidates(rule: &RecurrenceRule, cursor: NaiveDateTime) -> Vec<NaiveDateTime> {
    let context = FilterContext {
        scope: rule.ordinal_scope(),
        week_start: rule.week_start(),
    };
    let filters = rule.filters();

    let days: Vec<NaiveDate> = candidate_days(rule, cursor.date())
        .into_iter()
        .filter(|day| filter::matches_date(*day, filters, context))
        .collect();
    if days.is_empty() {
        return Vec::new();
    }
    let times = candidate_times(rule, cursor.time());

    let found: Vec<NaiveDateTime> = days
        .iter()
        .flat_map(|day| times.iter().map(move |time| day.and_time(*time)))
        .filter(|candidate| filter::matches(*candidate, filters, context))
        .collect();

    match filters.set_positions() {
        Some(positions) => select_positions(&found, positions),
        None => found,
    }
}

/// ## Summary
/// Earliest timestamp any candidate of the period at `cursor` can have.
///
/// Periods never overlap and advance monotonically, so once this floor is
/// past an `Until` bound no later period can produce an occurrence.
pub(crate) fn floor(rule: &RecurrenceRule, cursor: NaiveDateTime) -> NaiveDateTime {
    let date = cursor.date();
    let first_day = match rule.frequency() {
        Frequency::Yearly => date.with_ordinal(1),
        Frequency::Monthly => date.with_day(1),
        Frequency::Weekly => week_start_of(rule, date),
        Frequency::Daily => Some(date),
        Frequency::Hourly => {
            return cursor
                .with_minute(0)
                .and_then(|dt| dt.with_second(0))
                .unwrap_or(cursor);
        }
        Frequency::Minutely => return cursor.with_second(0).unwrap_or(cursor),
        Frequency::Secondly => return cursor,
    };
    first_day.map_or(cursor, |day| day.and_time(NaiveTime::MIN))
}

fn candidate_days(rule: &RecurrenceRule, cursor: NaiveDate) -> Vec<NaiveDate> {
    let filters = rule.filters();
    let selects_days = filters.selects_days();
    let selects_weeks = filters.selects_weeks();

    match rule.frequency() {
        Frequency::Yearly if selects_days || selects_weeks => {
            days_from(cursor.with_ordinal(1), days_in_year(cursor.year()))
        }
        Frequency::Yearly => match filters.months() {
            // Only months given: the anchor's day of month in each of them.
            Some(months) => months
                .iter()
                .filter_map(|&month| clamped_date(cursor.year(), month, rule.anchor().day()))
                .collect(),
            None => vec![cursor],
        },
        Frequency::Monthly if selects_days || selects_weeks => days_from(
            cursor.with_day(1),
            days_in_month(cursor.year(), cursor.month()),
        ),
        Frequency::Weekly if selects_days => days_from(week_start_of(rule, cursor), 7),
        _ => vec![cursor],
    }
}

fn days_from(first: Option<NaiveDate>, len: u32) -> Vec<NaiveDate> {
    first
        .map(|first| first.iter_days().take(len as usize).collect())
        .unwrap_or_default()
}

fn week_start_of(rule: &RecurrenceRule, date: NaiveDate) -> Option<NaiveDate> {
    let back = Weekday::from(date.weekday()).days_since(rule.week_start());
    date.checked_sub_days(Days::new(u64::from(back)))
}

/// Times of day for each candidate day.
///
/// A time field finer than the frequency is expanded from its filter (or
/// kept at the cursor's value when unfiltered); a field at or above the
/// frequency keeps the cursor's value and is only checked by the filter.
fn candidate_times(rule: &RecurrenceRule, cursor: NaiveTime) -> Vec<NaiveTime> {
    let frequency = rule.frequency();
    let filters = rule.filters();

    let hours = expand_field(frequency > Frequency::Hourly, filters.hours(), cursor.hour());
    let minutes = expand_field(frequency > Frequency::Minutely, filters.minutes(), cursor.minute());
    let seconds = expand_field(frequency > Frequency::Secondly, filters.seconds(), cursor.second());

    let mut times = Vec::with_capacity(hours.len() * minutes.len() * seconds.len());
    for &hour in &hours {
        for &minute in &minutes {
            times.extend(
                seconds
                    .iter()
                    .filter_map(|&second| NaiveTime::from_hms_opt(hour, minute, second)),
            );
        }
    }
    times
}

fn expand_field(expand: bool, values: Option<&BTreeSet<u32>>, current: u32) -> Vec<u32> {
    match values {
        Some(values) if expand => values.iter().copied().collect(),
        _ => vec![current],
    }
}

/// Picks the 1-based (negative: from the end) positions out of a period's
/// sorted candidates, keeping chronological order.
fn select_positions(found: &[NaiveDateTime], positions: &BTreeSet<i32>) -> Vec<NaiveDateTime> {
    let len = i64::try_from(found.len()).unwrap_or(i64::MAX);
    let mut selected: Vec<NaiveDateTime> = positions
        .iter()
        .filter_map(|&pos| {
            let pos = i64::from(pos);
            let index = if pos > 0 { pos - 1 } else { len + pos };
            usize::try_from(index).ok().and_then(|i| found.get(i).copied())
        })
        .collect();
    selected.sort_unstable();
    selected.dedup();
    selected
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, s))
            .unwrap()
    }

    #[test]
    fn unfiltered_period_is_the_cursor() {
        let rule = RecurrenceRule::monthly(at(2020, 1, 31, 9, 0, 0)).build().unwrap();
        let cursor = at(2020, 2, 29, 9, 0, 0);
        assert_eq!(candidates(&rule, cursor), [cursor]);
    }

    #[test]
    fn weekly_weekdays_expand_the_whole_week() {
        // Wednesday anchor, Monday week start.
        let rule = RecurrenceRule::weekly(at(2020, 1, 1, 9, 0, 0))
            .with_by_weekday([Weekday::Monday, Weekday::Wednesday, Weekday::Friday])
            .build()
            .unwrap();
        let found = candidates(&rule, rule.anchor());
        assert_eq!(
            found,
            [
                at(2019, 12, 30, 9, 0, 0),
                at(2020, 1, 1, 9, 0, 0),
                at(2020, 1, 3, 9, 0, 0),
            ]
        );
    }

    #[test]
    fn week_start_shifts_weekly_period() {
        let rule = RecurrenceRule::weekly(at(2020, 1, 1, 9, 0, 0))
            .with_by_weekday([Weekday::Sunday])
            .with_week_start(Weekday::Sunday)
            .build()
            .unwrap();
        // The Sunday-started week containing Wed Jan 1 begins Sun Dec 29.
        assert_eq!(candidates(&rule, rule.anchor()), [at(2019, 12, 29, 9, 0, 0)]);
    }

    #[test]
    fn week_numbers_expand_months_but_not_weeks() {
        // Week 2 of 2020 runs Mon Jan 6 through Sun Jan 12.
        let monthly = RecurrenceRule::monthly(at(2020, 1, 1, 9, 0, 0))
            .with_by_week_number([2])
            .build()
            .unwrap();
        let found = candidates(&monthly, monthly.anchor());
        assert_eq!(found.first(), Some(&at(2020, 1, 6, 9, 0, 0)));
        assert_eq!(found.len(), 7);

        let weekly = RecurrenceRule::weekly(at(2020, 1, 8, 9, 0, 0))
            .with_by_week_number([2])
            .build()
            .unwrap();
        assert_eq!(candidates(&weekly, weekly.anchor()), [weekly.anchor()]);
    }

    #[test]
    fn monthly_month_day_expands_month() {
        let rule = RecurrenceRule::monthly(at(2020, 1, 1, 9, 0, 0))
            .with_by_month_day([15, -1])
            .build()
            .unwrap();
        assert_eq!(
            candidates(&rule, at(2020, 2, 1, 9, 0, 0)),
            [at(2020, 2, 15, 9, 0, 0), at(2020, 2, 29, 9, 0, 0)]
        );
    }

    #[test]
    fn yearly_months_keep_anchor_day_clamped() {
        let rule = RecurrenceRule::yearly(at(2021, 1, 31, 0, 0, 0))
            .with_by_month([2, 4, 5])
            .build()
            .unwrap();
        assert_eq!(
            candidates(&rule, rule.anchor()),
            [
                at(2021, 2, 28, 0, 0, 0),
                at(2021, 4, 30, 0, 0, 0),
                at(2021, 5, 31, 0, 0, 0),
            ]
        );
    }

    #[test]
    fn daily_expands_hours_and_minutes() {
        let rule = RecurrenceRule::daily(at(2020, 1, 1, 9, 15, 0))
            .with_by_hour([8, 17])
            .with_by_minute([0, 30])
            .build()
            .unwrap();
        let found = candidates(&rule, rule.anchor());
        assert_eq!(
            found,
            [
                at(2020, 1, 1, 8, 0, 0),
                at(2020, 1, 1, 8, 30, 0),
                at(2020, 1, 1, 17, 0, 0),
                at(2020, 1, 1, 17, 30, 0),
            ]
        );
    }

    #[test]
    fn hourly_filters_hour_but_expands_minutes() {
        let rule = RecurrenceRule::builder(Frequency::Hourly, at(2020, 1, 1, 9, 0, 0))
            .with_by_hour([10])
            .with_by_minute([0, 45])
            .build()
            .unwrap();
        assert!(candidates(&rule, at(2020, 1, 1, 9, 0, 0)).is_empty());
        assert_eq!(
            candidates(&rule, at(2020, 1, 1, 10, 0, 0)),
            [at(2020, 1, 1, 10, 0, 0), at(2020, 1, 1, 10, 45, 0)]
        );
    }

    #[test]
    fn set_position_picks_last_weekday_of_month() {
        let rule = RecurrenceRule::monthly(at(2020, 1, 1, 0, 0, 0))
            .with_by_weekday([
                Weekday::Monday,
                Weekday::Tuesday,
                Weekday::Wednesday,
                Weekday::Thursday,
                Weekday::Friday,
            ])
            .with_by_set_position([-1, 1])
            .build()
            .unwrap();
        // May 2020: Friday 1st, Friday 29th (30-31 is a weekend).
        assert_eq!(
            candidates(&rule, at(2020, 5, 1, 0, 0, 0)),
            [at(2020, 5, 1, 0, 0, 0), at(2020, 5, 29, 0, 0, 0)]
        );
    }

    #[test]
    fn set_position_out_of_range_selects_nothing() {
        let found = [at(2020, 1, 1, 0, 0, 0)];
        let positions: BTreeSet<i32> = [2, -2].into_iter().collect();
        assert!(select_positions(&found, &positions).is_empty());
    }

    #[test]
    fn floor_truncates_to_period_start() {
        let cursor = at(2020, 5, 14, 10, 45, 30);
        let monthly = RecurrenceRule::monthly(cursor).build().unwrap();
        let weekly = RecurrenceRule::weekly(cursor).build().unwrap();
        let hourly = RecurrenceRule::builder(Frequency::Hourly, cursor).build().unwrap();
        assert_eq!(floor(&monthly, cursor), at(2020, 5, 1, 0, 0, 0));
        // Thursday 14th; the Monday-started week begins on the 11th.
        assert_eq!(floor(&weekly, cursor), at(2020, 5, 11, 0, 0, 0));
        assert_eq!(floor(&hourly, cursor), at(2020, 5, 14, 10, 0, 0));
    }
}
