//! Lazy occurrence iteration and the query views built on top of it.

use std::collections::VecDeque;
use std::ops::Range;

use chrono::{DateTime, FixedOffset, NaiveDateTime, Offset, Utc};

use super::{period, reach, stepper};
use crate::error::{RRuleError, RRuleResult};
use crate::model::{RecurrenceRule, Termination};

/// Iterator over the occurrences of one [`RecurrenceRule`].
///
/// Each instance owns its own position; creating a new one replays the rule
/// from its anchor. Occurrences are strictly increasing.
#[derive(Debug, Clone)]
pub struct Occurrences<'a> {
    rule: &'a RecurrenceRule,
    /// Index `k` of the next period to expand; its cursor is
    /// `anchor + k * interval` frequency units.
    period: i64,
    pending: VecDeque<NaiveDateTime>,
    emitted: u32,
    /// Consecutive periods that produced no candidate.
    empty_periods: u64,
    terminated: bool,
}

impl<'a> Occurrences<'a> {
    #[must_use]
    pub fn new(rule: &'a RecurrenceRule) -> Self {
        Self {
            rule,
            period: 0,
            pending: VecDeque::new(),
            emitted: 0,
            empty_periods: 0,
            terminated: false,
        }
    }

    fn terminate(&mut self, reason: &str) {
        tracing::trace!(emitted = self.emitted, reason, "Recurrence terminated");
        self.terminated = true;
        self.pending.clear();
    }

    /// Expands the next period into `pending`, or terminates once no later
    /// period can produce an occurrence.
    fn expand_next_period(&mut self) {
        let rule = self.rule;
        let cursor = self
            .period
            .checked_mul(i64::from(rule.interval()))
            .and_then(|units| stepper::advance(rule.anchor(), rule.frequency(), units));
        let Some(cursor) = cursor else {
            self.terminate("end of representable calendar");
            return;
        };

        if let Termination::Until(until) = rule.termination()
            && period::floor(rule, cursor) > until
        {
            self.terminate("period starts after until");
            return;
        }

        let candidates = period::candidates(rule, cursor);
        tracing::trace!(
            period = self.period,
            %cursor,
            candidates = candidates.len(),
            "Expanded recurrence period"
        );
        self.period += 1;

        if candidates.is_empty() {
            self.empty_periods += 1;
            if self.empty_periods >= reach::cycle_periods(rule) {
                self.terminate("calendar cycle without occurrences");
            }
        } else {
            self.empty_periods = 0;
            self.pending.extend(candidates);
        }
    }
}

impl Iterator for Occurrences<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.terminated {
            if let Termination::Count(count) = self.rule.termination()
                && self.emitted >= count
            {
                self.terminate("count reached");
                break;
            }

            let Some(candidate) = self.pending.pop_front() else {
                self.expand_next_period();
                continue;
            };
            if candidate < self.rule.anchor() {
                continue;
            }
            if let Termination::Until(until) = self.rule.termination()
                && candidate > until
            {
                self.terminate("candidate after until");
                break;
            }

            self.emitted += 1;
            return Some(candidate);
        }
        None
    }
}

impl std::iter::FusedIterator for Occurrences<'_> {}

impl<'a> IntoIterator for &'a RecurrenceRule {
    type Item = NaiveDateTime;
    type IntoIter = Occurrences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        Occurrences::new(self)
    }
}

/// Attaches a fixed UTC offset to every naive occurrence of the inner
/// iterator.
#[derive(Debug, Clone)]
pub struct Zoned<I> {
    inner: I,
    offset: FixedOffset,
}

impl<I> Zoned<I> {
    #[must_use]
    pub const fn new(inner: I, offset: FixedOffset) -> Self {
        Self { inner, offset }
    }

    #[must_use]
    pub const fn offset(&self) -> FixedOffset {
        self.offset
    }
}

impl<I> Iterator for Zoned<I>
where
    I: Iterator<Item = NaiveDateTime>,
{
    type Item = DateTime<FixedOffset>;

    fn next(&mut self) -> Option<Self::Item> {
        // A fixed offset is never ambiguous; `single` only fails when the
        // shifted instant leaves chrono's range, and that ends the sequence.
        self.inner
            .next()
            .and_then(|dt| dt.and_local_timezone(self.offset).single())
    }
}

impl RecurrenceRule {
    /// Returns a fresh iterator over this rule's occurrences.
    #[must_use]
    pub fn iter(&self) -> Occurrences<'_> {
        Occurrences::new(self)
    }

    /// Occurrences as offset-aware timestamps, using the rule's offset or UTC
    /// when none was attached.
    #[must_use]
    pub fn zoned(&self) -> Zoned<Occurrences<'_>> {
        Zoned::new(self.iter(), self.offset().unwrap_or_else(|| Utc.fix()))
    }

    /// ## Summary
    /// Occurrences whose zero-based index lies in `range`.
    ///
    /// Stops reading as soon as `range.end` is reached, so slicing an
    /// unbounded rule is safe.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Vec<NaiveDateTime> {
        slice_in(self.iter(), range)
    }

    /// ## Summary
    /// The occurrence at zero-based `index`.
    ///
    /// ## Errors
    ///
    /// Returns `IndexOutOfRange` if the rule terminates before reaching
    /// `index`.
    pub fn nth_occurrence(&self, index: usize) -> RRuleResult<NaiveDateTime> {
        nth_in(self.iter(), index)
    }

    /// ## Summary
    /// Occurrences strictly between `after` and `before`, or including both
    /// bounds when `inclusive` is set.
    #[must_use]
    pub fn between(
        &self,
        after: NaiveDateTime,
        before: NaiveDateTime,
        inclusive: bool,
    ) -> Vec<NaiveDateTime> {
        between_in(self.iter(), after, before, inclusive)
    }

    /// First occurrence after `dt` (at or after it when `inclusive`).
    #[must_use]
    pub fn after(&self, dt: NaiveDateTime, inclusive: bool) -> Option<NaiveDateTime> {
        after_in(self.iter(), dt, inclusive)
    }

    /// Last occurrence before `dt` (at or before it when `inclusive`).
    #[must_use]
    pub fn before(&self, dt: NaiveDateTime, inclusive: bool) -> Option<NaiveDateTime> {
        before_in(self.iter(), dt, inclusive)
    }
}

pub(crate) fn slice_in<I>(iter: I, range: Range<usize>) -> Vec<NaiveDateTime>
where
    I: Iterator<Item = NaiveDateTime>,
{
    iter.skip(range.start)
        .take(range.end.saturating_sub(range.start))
        .collect()
}

pub(crate) fn nth_in<I>(iter: I, index: usize) -> RRuleResult<NaiveDateTime>
where
    I: Iterator<Item = NaiveDateTime>,
{
    let mut len = 0;
    for (i, dt) in iter.enumerate() {
        if i == index {
            return Ok(dt);
        }
        len = i + 1;
    }
    Err(RRuleError::IndexOutOfRange { index, len })
}

pub(crate) fn between_in<I>(
    iter: I,
    after: NaiveDateTime,
    before: NaiveDateTime,
    inclusive: bool,
) -> Vec<NaiveDateTime>
where
    I: Iterator<Item = NaiveDateTime>,
{
    iter.take_while(|dt| if inclusive { *dt <= before } else { *dt < before })
        .filter(|dt| if inclusive { *dt >= after } else { *dt > after })
        .collect()
}

pub(crate) fn after_in<I>(mut iter: I, dt: NaiveDateTime, inclusive: bool) -> Option<NaiveDateTime>
where
    I: Iterator<Item = NaiveDateTime>,
{
    iter.find(|occ| if inclusive { *occ >= dt } else { *occ > dt })
}

pub(crate) fn before_in<I>(iter: I, dt: NaiveDateTime, inclusive: bool) -> Option<NaiveDateTime>
where
    I: Iterator<Item = NaiveDateTime>,
{
    iter.take_while(|occ| if inclusive { *occ <= dt } else { *occ < dt })
        .last()
}
