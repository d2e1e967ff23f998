//! Union of recurrence rules and explicit dates.

use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap};
use std::ops::Range;

use chrono::{FixedOffset, NaiveDateTime, Offset, Utc};

use crate::error::RRuleResult;
use crate::expand::{Zoned, after_in, before_in, between_in, nth_in, slice_in};
use crate::model::RecurrenceRule;

/// ## Summary
/// A set of recurring occurrences, combining rules, extra dates and
/// excluded dates.
///
/// Iteration merges every rule's occurrences with the extra dates in
/// chronological order, drops duplicates and skips excluded timestamps.
/// Nothing is materialised up front, so unbounded rules are fine as long as
/// the consumer bounds what it reads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecurrenceSet {
    rules: Vec<RecurrenceRule>,
    rdates: BTreeSet<NaiveDateTime>,
    exdates: BTreeSet<NaiveDateTime>,
    offset: Option<FixedOffset>,
}

impl RecurrenceSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule whose occurrences join the set.
    #[must_use]
    pub fn with_rule(mut self, rule: RecurrenceRule) -> Self {
        self.rules.push(rule);
        self
    }

    /// Adds a single extra occurrence.
    #[must_use]
    pub fn with_rdate(mut self, dt: NaiveDateTime) -> Self {
        self.rdates.insert(dt);
        self
    }

    /// Excludes a timestamp, whichever source produces it.
    #[must_use]
    pub fn with_exdate(mut self, dt: NaiveDateTime) -> Self {
        self.exdates.insert(dt);
        self
    }

    /// Attaches an already-resolved UTC offset for [`zoned`](Self::zoned).
    #[must_use]
    pub fn with_offset(mut self, offset: FixedOffset) -> Self {
        self.offset = Some(offset);
        self
    }

    #[must_use]
    pub fn rules(&self) -> &[RecurrenceRule] {
        &self.rules
    }

    #[must_use]
    pub const fn rdates(&self) -> &BTreeSet<NaiveDateTime> {
        &self.rdates
    }

    #[must_use]
    pub const fn exdates(&self) -> &BTreeSet<NaiveDateTime> {
        &self.exdates
    }

    #[must_use]
    pub const fn offset(&self) -> Option<FixedOffset> {
        self.offset
    }

    /// Returns a fresh iterator over the merged occurrences.
    #[must_use]
    pub fn iter(&self) -> SetOccurrences<'_> {
        SetOccurrences::new(self)
    }

    /// Merged occurrences as offset-aware timestamps, using the set's offset
    /// or UTC when none was attached.
    #[must_use]
    pub fn zoned(&self) -> Zoned<SetOccurrences<'_>> {
        Zoned::new(self.iter(), self.offset.unwrap_or_else(|| Utc.fix()))
    }

    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Vec<NaiveDateTime> {
        slice_in(self.iter(), range)
    }

    /// ## Summary
    /// The merged occurrence at zero-based `index`.
    ///
    /// ## Errors
    ///
    /// Returns `IndexOutOfRange` if the set ends before reaching `index`.
    pub fn nth_occurrence(&self, index: usize) -> RRuleResult<NaiveDateTime> {
        nth_in(self.iter(), index)
    }

    #[must_use]
    pub fn between(
        &self,
        after: NaiveDateTime,
        before: NaiveDateTime,
        inclusive: bool,
    ) -> Vec<NaiveDateTime> {
        between_in(self.iter(), after, before, inclusive)
    }

    #[must_use]
    pub fn after(&self, dt: NaiveDateTime, inclusive: bool) -> Option<NaiveDateTime> {
        after_in(self.iter(), dt, inclusive)
    }

    #[must_use]
    pub fn before(&self, dt: NaiveDateTime, inclusive: bool) -> Option<NaiveDateTime> {
        before_in(self.iter(), dt, inclusive)
    }
}

impl<'a> IntoIterator for &'a RecurrenceSet {
    type Item = NaiveDateTime;
    type IntoIter = SetOccurrences<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

type Source<'a> = Box<dyn Iterator<Item = NaiveDateTime> + 'a>;

/// Lazy k-way merge over the sources of a [`RecurrenceSet`].
pub struct SetOccurrences<'a> {
    sources: Vec<Source<'a>>,
    /// Head of each source that still has one, keyed by source index.
    heads: BinaryHeap<Reverse<(NaiveDateTime, usize)>>,
    exdates: &'a BTreeSet<NaiveDateTime>,
    last: Option<NaiveDateTime>,
}

impl<'a> SetOccurrences<'a> {
    fn new(set: &'a RecurrenceSet) -> Self {
        let mut sources: Vec<Source<'a>> = set
            .rules
            .iter()
            .map(|rule| Box::new(rule.iter()) as Source<'a>)
            .collect();
        sources.push(Box::new(set.rdates.iter().copied()));

        let mut heads = BinaryHeap::with_capacity(sources.len());
        for (index, source) in sources.iter_mut().enumerate() {
            if let Some(head) = source.next() {
                heads.push(Reverse((head, index)));
            }
        }

        Self {
            sources,
            heads,
            exdates: &set.exdates,
            last: None,
        }
    }
}

impl Iterator for SetOccurrences<'_> {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(Reverse((dt, index))) = self.heads.pop() {
            if let Some(next) = self.sources.get_mut(index).and_then(Iterator::next) {
                self.heads.push(Reverse((next, index)));
            }

            if self.last == Some(dt) {
                continue;
            }
            self.last = Some(dt);
            if self.exdates.contains(&dt) {
                tracing::trace!(%dt, "Skipping excluded occurrence");
                continue;
            }
            return Some(dt);
        }
        None
    }
}

impl std::fmt::Debug for SetOccurrences<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SetOccurrences")
            .field("sources", &self.sources.len())
            .field("heads", &self.heads)
            .field("last", &self.last)
            .finish_non_exhaustive()
    }
}
