//! Recurrence expansion.
//!
//! Turning a [`RecurrenceRule`](crate::RecurrenceRule) into occurrences is
//! split into these layers:
//! - [`stepper`]: calendar arithmetic that moves the cursor by whole
//!   frequency units, clamping the day of month when it overflows
//! - [`filter`]: the pure predicate deciding whether a timestamp satisfies
//!   every BY-rule filter
//! - `period`: enumeration of the candidates inside one frequency period
//! - `iter`: the lazy iterator and the query views built on it
//! - `reach`: build-time proof that a rule's filters can ever be met

pub mod filter;
mod iter;
mod period;
mod reach;
pub mod stepper;

pub use filter::OrdinalScope;
pub use iter::{Occurrences, Zoned};
pub(crate) use iter::{after_in, before_in, between_in, nth_in, slice_in};
pub(crate) use reach::{cursor_time_reachable, date_filters_satisfiable, months_reachable};
