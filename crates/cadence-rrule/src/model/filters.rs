//! BY-rule filter record.

use std::collections::BTreeSet;

use super::WeekdayRef;

/// The BY-rule filters of a recurrence rule.
///
/// One optional set per filter kind. `None` means the kind is unconstrained;
/// a present set is never empty and only holds values that passed range
/// validation in [`RecurrenceRuleBuilder::build`](super::RecurrenceRuleBuilder::build).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub(crate) months: Option<BTreeSet<u32>>,
    pub(crate) month_days: Option<BTreeSet<i32>>,
    pub(crate) weekdays: Option<BTreeSet<WeekdayRef>>,
    pub(crate) year_days: Option<BTreeSet<i32>>,
    pub(crate) week_numbers: Option<BTreeSet<i32>>,
    pub(crate) hours: Option<BTreeSet<u32>>,
    pub(crate) minutes: Option<BTreeSet<u32>>,
    pub(crate) seconds: Option<BTreeSet<u32>>,
    pub(crate) set_positions: Option<BTreeSet<i32>>,
}

impl Filters {
    /// Months of the year, `1..=12`.
    #[must_use]
    pub fn months(&self) -> Option<&BTreeSet<u32>> {
        self.months.as_ref()
    }

    /// Days of the month, `1..=31` or `-31..=-1` counting from the month end.
    #[must_use]
    pub fn month_days(&self) -> Option<&BTreeSet<i32>> {
        self.month_days.as_ref()
    }

    #[must_use]
    pub fn weekdays(&self) -> Option<&BTreeSet<WeekdayRef>> {
        self.weekdays.as_ref()
    }

    /// Days of the year, `1..=366` or `-366..=-1` counting from the year end.
    #[must_use]
    pub fn year_days(&self) -> Option<&BTreeSet<i32>> {
        self.year_days.as_ref()
    }

    /// Week numbers, `1..=53` or `-53..=-1` counting from the last week.
    #[must_use]
    pub fn week_numbers(&self) -> Option<&BTreeSet<i32>> {
        self.week_numbers.as_ref()
    }

    #[must_use]
    pub fn hours(&self) -> Option<&BTreeSet<u32>> {
        self.hours.as_ref()
    }

    #[must_use]
    pub fn minutes(&self) -> Option<&BTreeSet<u32>> {
        self.minutes.as_ref()
    }

    #[must_use]
    pub fn seconds(&self) -> Option<&BTreeSet<u32>> {
        self.seconds.as_ref()
    }

    /// Positions selected from each period's candidate list, 1-based, negative
    /// from the end.
    #[must_use]
    pub fn set_positions(&self) -> Option<&BTreeSet<i32>> {
        self.set_positions.as_ref()
    }

    /// Whether a month-day, weekday or year-day filter picks individual days.
    ///
    /// Any of these makes a weekly, monthly or yearly period expand into its
    /// days instead of keeping the stepped day.
    #[must_use]
    pub fn selects_days(&self) -> bool {
        self.month_days.is_some() || self.weekdays.is_some() || self.year_days.is_some()
    }

    /// Whether a week-number filter picks whole weeks.
    ///
    /// This expands monthly and yearly periods into their days, but not a
    /// weekly one, which already is a single week.
    #[must_use]
    pub fn selects_weeks(&self) -> bool {
        self.week_numbers.is_some()
    }

    /// Whether any weekday reference carries an ordinal.
    #[must_use]
    pub fn has_weekday_ordinals(&self) -> bool {
        self.weekdays
            .iter()
            .flatten()
            .any(|wd| wd.ordinal().is_some())
    }
}
