//! External process abstraction.
//!
//! Background jobs shell out through [`ProcessRunner`] so tests can record
//! invocations instead of spawning real programs.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::error::ProcessError;

/// A program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessSpec {
    /// Executable name or path.
    pub program: String,
    /// Arguments, without the program name.
    pub args: Vec<String>,
    /// Working directory.
    pub working_dir: PathBuf,
    /// Upper bound on the run time.
    pub timeout: Duration,
}

/// Captured result of a finished program.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessOutput {
    /// Exit code; `None` when the program was terminated by a signal.
    pub status_code: Option<i32>,
    /// Captured standard output.
    pub stdout: String,
    /// Captured standard error.
    pub stderr: String,
}

impl ProcessOutput {
    /// Whether the program exited with status zero.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status_code == Some(0)
    }
}

/// Runs external programs to completion.
#[async_trait]
pub trait ProcessRunner: Send + Sync {
    /// Runs `spec` and captures its output.
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError>;
}
