//! Recurrence rule value object and its validating builder.

use std::collections::BTreeSet;
use std::fmt::Display;
use std::ops::RangeInclusive;

use chrono::{FixedOffset, NaiveDateTime, Timelike};

use super::{Filters, Frequency, Weekday, WeekdayRef};
use crate::error::{RRuleError, RRuleResult};
use crate::expand::stepper::max_days_in_month;
use crate::expand::{self, OrdinalScope};

/// When a recurrence stops producing occurrences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Termination {
    /// Never stops on its own; the consumer bounds what it reads.
    #[default]
    Unbounded,
    /// Stops after exactly this many occurrences.
    Count(u32),
    /// Stops after the last occurrence at or before this timestamp.
    Until(NaiveDateTime),
}

/// Immutable, validated recurrence rule.
///
/// Build one with [`RecurrenceRule::builder`] or one of the frequency
/// shortcuts such as [`RecurrenceRule::weekly`]. A built rule has no
/// mutators; every call to [`RecurrenceRule::iter`] replays the same
/// sequence from the anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecurrenceRule {
    frequency: Frequency,
    anchor: NaiveDateTime,
    offset: Option<FixedOffset>,
    interval: u32,
    termination: Termination,
    filters: Filters,
    week_start: Weekday,
}

impl RecurrenceRule {
    /// Starts building a rule with the given frequency and anchor.
    #[must_use]
    pub fn builder(frequency: Frequency, anchor: NaiveDateTime) -> RecurrenceRuleBuilder {
        RecurrenceRuleBuilder::new(frequency, anchor)
    }

    /// Starts building a yearly rule.
    #[must_use]
    pub fn yearly(anchor: NaiveDateTime) -> RecurrenceRuleBuilder {
        Self::builder(Frequency::Yearly, anchor)
    }

    /// Starts building a monthly rule.
    #[must_use]
    pub fn monthly(anchor: NaiveDateTime) -> RecurrenceRuleBuilder {
        Self::builder(Frequency::Monthly, anchor)
    }

    /// Starts building a weekly rule.
    #[must_use]
    pub fn weekly(anchor: NaiveDateTime) -> RecurrenceRuleBuilder {
        Self::builder(Frequency::Weekly, anchor)
    }

    /// Starts building a daily rule.
    #[must_use]
    pub fn daily(anchor: NaiveDateTime) -> RecurrenceRuleBuilder {
        Self::builder(Frequency::Daily, anchor)
    }

    #[must_use]
    pub const fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// The first candidate and origin of all stepping.
    #[must_use]
    pub const fn anchor(&self) -> NaiveDateTime {
        self.anchor
    }

    /// Already-resolved offset carried onto zoned occurrences.
    #[must_use]
    pub const fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    #[must_use]
    pub const fn interval(&self) -> u32 {
        self.interval
    }

    #[must_use]
    pub const fn termination(&self) -> Termination {
        self.termination
    }

    #[must_use]
    pub const fn filters(&self) -> &Filters {
        &self.filters
    }

    #[must_use]
    pub const fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// Period within which weekday ordinals ("the 2nd Tuesday") are counted.
    #[must_use]
    pub fn ordinal_scope(&self) -> OrdinalScope {
        match self.frequency {
            Frequency::Yearly if self.filters.months.is_none() => OrdinalScope::Year,
            _ => OrdinalScope::Month,
        }
    }
}

/// Builder for [`RecurrenceRule`].
///
/// Filter setters accept any iterable; values are collected as given and only
/// checked by [`build`](Self::build), so every validation failure surfaces in
/// one place.
#[derive(Debug, Clone)]
pub struct RecurrenceRuleBuilder {
    frequency: Frequency,
    anchor: NaiveDateTime,
    offset: Option<FixedOffset>,
    interval: u32,
    termination: Termination,
    week_start: Weekday,
    by_month: Option<Vec<u32>>,
    by_month_day: Option<Vec<i32>>,
    by_weekday: Option<Vec<WeekdayRef>>,
    by_year_day: Option<Vec<i32>>,
    by_week_number: Option<Vec<i32>>,
    by_hour: Option<Vec<u32>>,
    by_minute: Option<Vec<u32>>,
    by_second: Option<Vec<u32>>,
    by_set_position: Option<Vec<i32>>,
}

impl RecurrenceRuleBuilder {
    #[must_use]
    pub fn new(frequency: Frequency, anchor: NaiveDateTime) -> Self {
        Self {
            frequency,
            anchor,
            offset: None,
            interval: 1,
            termination: Termination::Unbounded,
            week_start: Weekday::Monday,
            by_month: None,
            by_month_day: None,
            by_weekday: None,
            by_year_day: None,
            by_week_number: None,
            by_hour: None,
            by_minute: None,
            by_second: None,
            by_set_position: None,
        }
    }

    /// Sets the interval (default 1).
    #[must_use]
    pub fn with_interval(mut self, interval: u32) -> Self {
        self.interval = interval;
        self
    }

    /// Bounds the rule to `count` occurrences, replacing any `until`.
    #[must_use]
    pub fn with_count(mut self, count: u32) -> Self {
        self.termination = Termination::Count(count);
        self
    }

    /// Bounds the rule at `until` (inclusive), replacing any `count`.
    #[must_use]
    pub fn with_until(mut self, until: NaiveDateTime) -> Self {
        self.termination = Termination::Until(until);
        self
    }

    /// Sets the termination policy directly.
    #[must_use]
    pub fn with_termination(mut self, termination: Termination) -> Self {
        self.termination = termination;
        self
    }

    /// Sets the week start day (default Monday).
    #[must_use]
    pub fn with_week_start(mut self, week_start: Weekday) -> Self {
        self.week_start = week_start;
        self
    }

    /// Attaches an already-resolved UTC offset.
    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn with_by_month(mut self, months: impl IntoIterator<Item = u32>) -> Self {
        self.by_month = Some(months.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_by_month_day(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.by_month_day = Some(days.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_by_weekday<W: Into<WeekdayRef>>(mut self, days: impl IntoIterator<Item = W>) -> Self {
        self.by_weekday = Some(days.into_iter().map(Into::into).collect());
        self
    }

    #[must_use]
    pub fn with_by_year_day(mut self, days: impl IntoIterator<Item = i32>) -> Self {
        self.by_year_day = Some(days.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_by_week_number(mut self, weeks: impl IntoIterator<Item = i32>) -> Self {
        self.by_week_number = Some(weeks.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_by_hour(mut self, hours: impl IntoIterator<Item = u32>) -> Self {
        self.by_hour = Some(hours.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_by_minute(mut self, minutes: impl IntoIterator<Item = u32>) -> Self {
        self.by_minute = Some(minutes.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_by_second(mut self, seconds: impl IntoIterator<Item = u32>) -> Self {
        self.by_second = Some(seconds.into_iter().collect());
        self
    }

    #[must_use]
    pub fn with_by_set_position(mut self, positions: impl IntoIterator<Item = i32>) -> Self {
        self.by_set_position = Some(positions.into_iter().collect());
        self
    }

    /// ## Summary
    /// Validates the collected parts and freezes them into a rule.
    ///
    /// ## Errors
    ///
    /// Returns `InvalidArgument` if:
    /// - the interval is zero
    /// - a filter set is present but empty
    /// - a filter value is outside the legal range for its kind
    /// - the month and month-day filters can never both hold
    /// - a weekday ordinal can never occur within its counting period
    /// - the interval keeps the cursor away from every month, weekday or
    ///   time of day the filters allow
    /// - no reachable calendar day passes every date filter at once
    pub fn build(self) -> RRuleResult<RecurrenceRule> {
        if self.interval == 0 {
            return Err(RRuleError::InvalidArgument(
                "interval must be at least 1".to_string(),
            ));
        }

        let filters = Filters {
            months: checked_set("month", self.by_month, &[1..=12])?,
            month_days: checked_set("month day", self.by_month_day, &[1..=31, -31..=-1])?,
            weekdays: checked_set("weekday", self.by_weekday, &[])?,
            year_days: checked_set("year day", self.by_year_day, &[1..=366, -366..=-1])?,
            week_numbers: checked_set("week number", self.by_week_number, &[1..=53, -53..=-1])?,
            hours: checked_set("hour", self.by_hour, &[0..=23])?,
            minutes: checked_set("minute", self.by_minute, &[0..=59])?,
            seconds: checked_set("second", self.by_second, &[0..=59])?,
            set_positions: checked_set("set position", self.by_set_position, &[1..=366, -366..=-1])?,
        };

        check_month_days_reachable(&filters)?;

        let anchor = self.anchor.with_nanosecond(0).unwrap_or(self.anchor);
        let rule = RecurrenceRule {
            frequency: self.frequency,
            anchor,
            offset: self.offset,
            interval: self.interval,
            termination: self.termination,
            filters,
            week_start: self.week_start,
        };
        check_ordinals_reachable(&rule)?;
        check_filters_reachable(&rule)?;

        tracing::debug!(
            frequency = %rule.frequency,
            interval = rule.interval,
            anchor = %rule.anchor,
            termination = ?rule.termination,
            "Built recurrence rule"
        );
        Ok(rule)
    }
}

/// Collects `values` into a set, rejecting an empty set or any value outside
/// `ranges`. An empty `ranges` slice accepts every value.
fn checked_set<T>(
    kind: &str,
    values: Option<Vec<T>>,
    ranges: &[RangeInclusive<T>],
) -> RRuleResult<Option<BTreeSet<T>>>
where
    T: Ord + Copy + Display,
{
    let Some(values) = values else {
        return Ok(None);
    };
    if values.is_empty() {
        return Err(RRuleError::InvalidArgument(format!(
            "{kind} filter must not be empty"
        )));
    }
    if let Some(bad) = values
        .iter()
        .find(|&&v| !ranges.is_empty() && !ranges.iter().any(|r| r.contains(&v)))
    {
        return Err(RRuleError::InvalidArgument(format!(
            "{kind} {bad} is out of range"
        )));
    }
    Ok(Some(values.into_iter().collect()))
}

fn check_month_days_reachable(filters: &Filters) -> RRuleResult<()> {
    let (Some(months), Some(days)) = (&filters.months, &filters.month_days) else {
        return Ok(());
    };
    let reachable = months.iter().any(|&month| {
        days.iter()
            .any(|&day| day.unsigned_abs() <= max_days_in_month(month))
    });
    if reachable {
        Ok(())
    } else {
        Err(RRuleError::InvalidArgument(
            "no month in the month filter has any day in the month-day filter".to_string(),
        ))
    }
}

fn check_ordinals_reachable(rule: &RecurrenceRule) -> RRuleResult<()> {
    let limit = match rule.ordinal_scope() {
        OrdinalScope::Month => 5,
        OrdinalScope::Year => 53,
    };
    let unreachable = rule
        .filters
        .weekdays
        .iter()
        .flatten()
        .find(|wd| wd.ordinal().is_some_and(|n| n.unsigned_abs() > limit));
    match unreachable {
        Some(wd) => Err(RRuleError::InvalidArgument(format!(
            "weekday {wd} can never occur within a {scope}",
            scope = rule.ordinal_scope()
        ))),
        None => Ok(()),
    }
}

fn check_filters_reachable(rule: &RecurrenceRule) -> RRuleResult<()> {
    let unreachable = if !expand::months_reachable(rule) {
        "the interval never reaches a month in the month filter"
    } else if !expand::cursor_time_reachable(rule) {
        "the interval never reaches a weekday or time of day the filters allow"
    } else if !expand::date_filters_satisfiable(rule) {
        "no calendar day satisfies every date filter"
    } else {
        return Ok(());
    };
    Err(RRuleError::InvalidArgument(unreachable.to_string()))
}
