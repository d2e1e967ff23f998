use thiserror::Error;

/// Recurrence rule construction and query errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RRuleError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Index {index} out of range for a recurrence of {len} occurrences")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type RRuleResult<T> = std::result::Result<T, RRuleError>;
