use thiserror::Error;

/// Application-level errors
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    RRuleError(#[from] cadence_rrule::RRuleError),

    #[error(transparent)]
    CoreError(#[from] cadence_core::error::CoreError),
}

pub type AppResult<T> = std::result::Result<T, AppError>;
