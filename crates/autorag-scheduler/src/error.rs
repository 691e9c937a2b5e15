//! Error types for scheduling

use thiserror::Error;

/// Scheduling errors
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SchedulerError {
    /// No schedule with this id
    #[error("Schedule not found: {0}")]
    NotFound(String),

    /// The timing specification cannot be scheduled
    #[error("Invalid schedule: {0}")]
    InvalidSpec(String),

    /// The scheduling backend failed
    #[error("Scheduler backend error: {0}")]
    Backend(String),
}

/// Result type alias for scheduler operations
pub type Result<T> = std::result::Result<T, SchedulerError>;

impl From<SchedulerError> for autorag_core::Error {
    fn from(err: SchedulerError) -> Self {
        autorag_core::Error::RemoteOperation(err.to_string())
    }
}
