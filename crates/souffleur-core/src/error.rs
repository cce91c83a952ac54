//! Domain and process error types.

use std::time::Duration;

use thiserror::Error;

/// Top-level domain error type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DomainError {
    /// Required input was missing or blank.
    #[error("validation error: {0}")]
    Validation(String),

    /// The caller is not allowed to perform the operation.
    #[error("unauthorized: {0}")]
    Unauthorized(String),
}

/// Failure to run an external program.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// The executable could not be found on `PATH`.
    #[error("executable not found: {0}")]
    NotFound(String),

    /// The program did not finish in time and was killed.
    #[error("{program} timed out after {after:?}")]
    TimedOut {
        /// The program that was run.
        program: String,
        /// The timeout that elapsed.
        after: Duration,
    },

    /// Spawning or waiting on the program failed.
    #[error("process I/O error: {0}")]
    Io(#[from] std::io::Error),
}
