//! Test process runners: mock `ProcessRunner` implementations for tests.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use souffleur_core::error::ProcessError;
use souffleur_core::process::{ProcessOutput, ProcessRunner, ProcessSpec};

/// A process runner that records every invocation and answers each one
/// with the configured output.
#[derive(Debug)]
pub struct RecordingProcessRunner {
    output: ProcessOutput,
    invocations: Mutex<Vec<ProcessSpec>>,
}

impl RecordingProcessRunner {
    /// Create a runner that returns `output` from every `run` call.
    #[must_use]
    pub fn new(output: ProcessOutput) -> Self {
        Self {
            output,
            invocations: Mutex::new(Vec::new()),
        }
    }

    /// Returns a snapshot of all recorded invocations.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn invocations(&self) -> Vec<ProcessSpec> {
        self.invocations.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProcessRunner for RecordingProcessRunner {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError> {
        self.invocations.lock().unwrap().push(spec.clone());
        Ok(self.output.clone())
    }
}

/// Which [`ProcessError`] a [`FailingProcessRunner`] produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// `ProcessError::NotFound`.
    NotFound,
    /// `ProcessError::TimedOut`.
    TimedOut,
    /// `ProcessError::Io`.
    Io,
}

/// A process runner that always fails. Useful for testing that job
/// failures are logged and swallowed.
#[derive(Debug)]
pub struct FailingProcessRunner(pub FailureKind);

#[async_trait]
impl ProcessRunner for FailingProcessRunner {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError> {
        Err(match self.0 {
            FailureKind::NotFound => ProcessError::NotFound(spec.program.clone()),
            FailureKind::TimedOut => ProcessError::TimedOut {
                program: spec.program.clone(),
                after: Duration::from_secs(300),
            },
            FailureKind::Io => {
                ProcessError::Io(std::io::Error::other("broken pipe"))
            }
        })
    }
}
