//! Recurrence rule value types.
//!
//! Everything in this module is plain, validated data. The behaviour that
//! turns a rule into occurrences lives in [`crate::expand`].

mod filters;
mod frequency;
mod rule;
mod weekday;

pub use filters::Filters;
pub use frequency::Frequency;
pub use rule::{RecurrenceRule, RecurrenceRuleBuilder, Termination};
pub use weekday::{Weekday, WeekdayRef};
