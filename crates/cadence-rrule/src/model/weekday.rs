//! Day-of-week identities used by BYDAY-style filters.

use std::fmt;
use std::str::FromStr;

use crate::error::{RRuleError, RRuleResult};

/// Day of the week, numbered Monday = 0 through Sunday = 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl Weekday {
    /// Returns all weekdays in order (Monday through Sunday).
    #[must_use]
    pub const fn all() -> [Self; 7] {
        [
            Self::Monday,
            Self::Tuesday,
            Self::Wednesday,
            Self::Thursday,
            Self::Friday,
            Self::Saturday,
            Self::Sunday,
        ]
    }

    /// Looks up a weekday by its index (Monday = 0).
    ///
    /// ## Errors
    ///
    /// Returns `InvalidArgument` if `index` is not in `0..=6`.
    pub fn from_index(index: u8) -> RRuleResult<Self> {
        Self::all()
            .get(usize::from(index))
            .copied()
            .ok_or_else(|| RRuleError::InvalidArgument(format!("weekday {index} not in 0..=6")))
    }

    /// Returns the index of this weekday (Monday = 0).
    #[must_use]
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Number of days from `week_start` forward to `self`, in `0..7`.
    #[must_use]
    pub const fn days_since(self, week_start: Self) -> u8 {
        (self.index() + 7 - week_start.index()) % 7
    }

    /// Returns the two-letter abbreviation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Monday => "MO",
            Self::Tuesday => "TU",
            Self::Wednesday => "WE",
            Self::Thursday => "TH",
            Self::Friday => "FR",
            Self::Saturday => "SA",
            Self::Sunday => "SU",
        }
    }

    /// Parses a weekday from a two-letter abbreviation (case-insensitive).
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        Some(match s.to_ascii_uppercase().as_str() {
            "MO" => Self::Monday,
            "TU" => Self::Tuesday,
            "WE" => Self::Wednesday,
            "TH" => Self::Thursday,
            "FR" => Self::Friday,
            "SA" => Self::Saturday,
            "SU" => Self::Sunday,
            _ => return None,
        })
    }

    /// Qualifies this weekday with an ordinal, e.g. `Weekday::Friday.nth(-1)`
    /// for "the last Friday".
    ///
    /// ## Errors
    ///
    /// Returns `InvalidArgument` if `ordinal` is zero.
    pub fn nth(self, ordinal: i32) -> RRuleResult<WeekdayRef> {
        WeekdayRef::nth(ordinal, self)
    }
}

impl From<chrono::Weekday> for Weekday {
    fn from(value: chrono::Weekday) -> Self {
        match value {
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
            chrono::Weekday::Sun => Self::Sunday,
        }
    }
}

impl fmt::Display for Weekday {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A weekday, optionally restricted to its n-th occurrence within a period.
///
/// Examples:
/// - `MO` - every Monday
/// - `2TU` - the second Tuesday of the month (or year)
/// - `-1FR` - the last Friday of the month (or year)
///
/// Equality, ordering and hashing are by `(day, ordinal)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct WeekdayRef {
    day: Weekday,
    ordinal: Option<i32>,
}

impl WeekdayRef {
    /// Creates a weekday reference from a raw day index and optional ordinal.
    ///
    /// ## Errors
    ///
    /// Returns `InvalidArgument` if `day` is not in `0..=6` or `ordinal` is
    /// `Some(0)`.
    pub fn new(day: u8, ordinal: Option<i32>) -> RRuleResult<Self> {
        let day = Weekday::from_index(day)?;
        match ordinal {
            Some(n) => Self::nth(n, day),
            None => Ok(Self::every(day)),
        }
    }

    /// Matches every occurrence of `day`.
    #[must_use]
    pub const fn every(day: Weekday) -> Self {
        Self { day, ordinal: None }
    }

    /// Matches only the `ordinal`-th occurrence of `day` (negative counts from
    /// the end of the period).
    ///
    /// ## Errors
    ///
    /// Returns `InvalidArgument` if `ordinal` is zero.
    pub fn nth(ordinal: i32, day: Weekday) -> RRuleResult<Self> {
        if ordinal == 0 {
            return Err(RRuleError::InvalidArgument(format!(
                "weekday ordinal for {day} must not be zero"
            )));
        }
        Ok(Self {
            day,
            ordinal: Some(ordinal),
        })
    }

    #[must_use]
    pub const fn day(self) -> Weekday {
        self.day
    }

    #[must_use]
    pub const fn ordinal(self) -> Option<i32> {
        self.ordinal
    }
}

impl From<Weekday> for WeekdayRef {
    fn from(day: Weekday) -> Self {
        Self::every(day)
    }
}

impl FromStr for WeekdayRef {
    type Err = RRuleError;

    /// Parses the BYDAY notation: an optional signed ordinal followed by a
    /// two-letter weekday (`MO`, `+2TU`, `-1FR`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || RRuleError::InvalidArgument(format!("invalid weekday reference `{s}`"));

        let split = s.len().checked_sub(2).ok_or_else(invalid)?;
        let ordinal = s.get(..split).ok_or_else(invalid)?;
        let day = s
            .get(split..)
            .and_then(Weekday::parse)
            .ok_or_else(invalid)?;

        if ordinal.is_empty() {
            return Ok(Self::every(day));
        }
        let ordinal = ordinal.parse::<i32>().map_err(|_parse| invalid())?;
        Self::nth(ordinal, day)
    }
}

impl fmt::Display for WeekdayRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(n) = self.ordinal {
            write!(f, "{n}")?;
        }
        write!(f, "{}", self.day)
    }
}
