//! Recurrence-rule engine.
//!
//! A [`RecurrenceRule`] describes a repeating pattern: a frequency, an
//! interval, an anchor timestamp, an optional count or end bound, and a set of
//! BY-rule filters. Occurrences are produced lazily and in chronological
//! order by a fresh [`Occurrences`] iterator every time the rule is iterated,
//! so one rule can be shared and replayed freely.
//!
//! The engine works on naive calendar timestamps. A resolved UTC offset may be
//! attached to a rule and is carried onto occurrences by [`RecurrenceRule::zoned`],
//! but it never takes part in the arithmetic.
//!
//! ```
//! use cadence_rrule::RecurrenceRule;
//! use chrono::NaiveDate;
//!
//! let anchor = NaiveDate::from_ymd_opt(2020, 1, 31)
//!     .and_then(|d| d.and_hms_opt(9, 0, 0))
//!     .ok_or("invalid anchor")?;
//! let rule = RecurrenceRule::monthly(anchor).with_count(3).build()?;
//! let days: Vec<_> = rule.iter().map(|dt| dt.date().to_string()).collect();
//! assert_eq!(days, ["2020-01-31", "2020-02-29", "2020-03-31"]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod error;
pub mod expand;
pub mod model;
pub mod set;

pub use error::{RRuleError, RRuleResult};
pub use expand::{Occurrences, Zoned};
pub use model::{
    Filters, Frequency, RecurrenceRule, RecurrenceRuleBuilder, Termination, Weekday, WeekdayRef,
};
pub use set::{RecurrenceSet, SetOccurrences};
