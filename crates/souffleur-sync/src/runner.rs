//! Process runner backed by `tokio::process`.

use std::io::ErrorKind;

use async_trait::async_trait;
use souffleur_core::error::ProcessError;
use souffleur_core::process::{ProcessOutput, ProcessRunner, ProcessSpec};
use tokio::process::Command;

/// Spawns real programs, killing them when the timeout elapses.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioProcessRunner;

#[async_trait]
impl ProcessRunner for TokioProcessRunner {
    async fn run(&self, spec: &ProcessSpec) -> Result<ProcessOutput, ProcessError> {
        let mut command = Command::new(&spec.program);
        command
            .args(&spec.args)
            .current_dir(&spec.working_dir)
            .kill_on_drop(true);

        let output = tokio::time::timeout(spec.timeout, command.output())
            .await
            .map_err(|_| ProcessError::TimedOut {
                program: spec.program.clone(),
                after: spec.timeout,
            })?
            .map_err(|e| match e.kind() {
                ErrorKind::NotFound => ProcessError::NotFound(spec.program.clone()),
                _ => ProcessError::Io(e),
            })?;

        Ok(ProcessOutput {
            status_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
        })
    }
}
