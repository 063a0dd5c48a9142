use chrono::NaiveDate;
use thiserror::Error;

/// Error types for the compute module.
///
/// These are local validation failures surfaced directly to the caller;
/// none of them is retryable. Storage errors never originate here because
/// every function in this crate is pure.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ComputeError {
    /// The requested range ends before it starts.
    #[error("Invalid date range: start {start} is after end {end}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },

    /// The operation is not valid for the target's temporal status,
    /// e.g. cancelling a version that is already current or past.
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// No current version could be resolved. A rule always carries one
    /// current version, so this indicates corrupted version history.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Type alias for Result with ComputeError
pub type Result<T> = std::result::Result<T, ComputeError>;
