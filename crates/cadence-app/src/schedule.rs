//! Turns a configured schedule into engine values.

use cadence_core::config::ScheduleConfig;
use cadence_core::error::CoreError;
use cadence_rrule::{Frequency, RecurrenceRule, RecurrenceSet, Weekday, WeekdayRef};

use crate::error::AppResult;

/// ## Summary
/// Builds the recurrence rule a [`ScheduleConfig`] describes.
///
/// ## Errors
/// Returns a `CoreError` for inconsistent configuration or an unknown week
/// start tag, and an `RRuleError` for anything the rule builder rejects.
pub fn build_rule(config: &ScheduleConfig) -> AppResult<RecurrenceRule> {
    config.validate()?;

    let frequency: Frequency = config.frequency.parse()?;
    let mut builder = RecurrenceRule::builder(frequency, config.start).with_interval(config.interval);

    if let Some(count) = config.count {
        builder = builder.with_count(count);
    }
    if let Some(until) = config.until {
        builder = builder.with_until(until);
    }
    if let Some(tag) = &config.week_start {
        let week_start = Weekday::parse(tag)
            .ok_or_else(|| CoreError::InvalidInput(format!("unknown week start `{tag}`")))?;
        builder = builder.with_week_start(week_start);
    }
    if let Some(offset) = config.offset()? {
        builder = builder.with_offset(offset);
    }

    if let Some(months) = &config.by_month {
        builder = builder.with_by_month(months.iter().copied());
    }
    if let Some(days) = &config.by_month_day {
        builder = builder.with_by_month_day(days.iter().copied());
    }
    if let Some(days) = &config.by_weekday {
        let days = days
            .iter()
            .map(|day| day.parse::<WeekdayRef>())
            .collect::<Result<Vec<_>, _>>()?;
        builder = builder.with_by_weekday(days);
    }
    if let Some(days) = &config.by_year_day {
        builder = builder.with_by_year_day(days.iter().copied());
    }
    if let Some(weeks) = &config.by_week_number {
        builder = builder.with_by_week_number(weeks.iter().copied());
    }
    if let Some(hours) = &config.by_hour {
        builder = builder.with_by_hour(hours.iter().copied());
    }
    if let Some(minutes) = &config.by_minute {
        builder = builder.with_by_minute(minutes.iter().copied());
    }
    if let Some(seconds) = &config.by_second {
        builder = builder.with_by_second(seconds.iter().copied());
    }
    if let Some(positions) = &config.by_set_position {
        builder = builder.with_by_set_position(positions.iter().copied());
    }

    Ok(builder.build()?)
}

/// ## Summary
/// Builds the configured rule together with its extra and excluded dates.
///
/// The set takes its offset from the rule, so zoned output matches the
/// rule's own.
///
/// ## Errors
/// Propagates every error of [`build_rule`].
pub fn build_set(config: &ScheduleConfig) -> AppResult<RecurrenceSet> {
    let rule = build_rule(config)?;
    let offset = rule.offset();
    let set = RecurrenceSet::new().with_rule(rule);
    let set = match offset {
        Some(offset) => set.with_offset(offset),
        None => set,
    };
    let set = config.rdates.iter().fold(set, |set, dt| set.with_rdate(*dt));
    let set = config.exdates.iter().fold(set, |set, dt| set.with_exdate(*dt));

    tracing::debug!(
        rdates = set.rdates().len(),
        exdates = set.exdates().len(),
        "Built recurrence set"
    );
    Ok(set)
}
