//! Sync scheduler error types.

use souffleur_core::error::ProcessError;
use thiserror::Error;

/// Errors raised while configuring or running the repository sync.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The configured daily time does not exist on a clock.
    #[error("invalid sync time {hour:02}:{minute:02}")]
    InvalidTime {
        /// Configured hour.
        hour: u32,
        /// Configured minute.
        minute: u32,
    },

    /// The pull command could not be run.
    #[error(transparent)]
    Process(#[from] ProcessError),
}
