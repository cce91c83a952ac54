//! The daily `git pull` loop.

use std::sync::Arc;

use souffleur_core::clock::Clock;
use souffleur_core::process::{ProcessOutput, ProcessRunner, ProcessSpec};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::error::SyncError;
use crate::schedule::{SyncSchedule, delay_until};

/// Periodically pulls the deployment's checkout.
pub struct RepositorySync {
    schedule: SyncSchedule,
    clock: Arc<dyn Clock>,
    runner: Arc<dyn ProcessRunner>,
}

impl RepositorySync {
    /// Create a sync job.
    #[must_use]
    pub fn new(
        schedule: SyncSchedule,
        clock: Arc<dyn Clock>,
        runner: Arc<dyn ProcessRunner>,
    ) -> Self {
        Self {
            schedule,
            clock,
            runner,
        }
    }

    /// The invocation used for every pull.
    #[must_use]
    pub fn pull_spec(&self) -> ProcessSpec {
        ProcessSpec {
            program: "git".to_owned(),
            args: vec!["pull".to_owned(), "--no-edit".to_owned()],
            working_dir: self.schedule.repo_dir.clone(),
            timeout: self.schedule.timeout,
        }
    }

    /// Runs one pull and logs its outcome.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::Process` if git could not be run or timed out.
    /// A non-zero exit status is logged but still returned as `Ok`.
    pub async fn pull_once(&self) -> Result<ProcessOutput, SyncError> {
        let output = self.runner.run(&self.pull_spec()).await?;
        let code = output.status_code;

        if !output.stdout.is_empty() {
            info!(status_code = ?code, stdout = %output.stdout, "git pull stdout");
        }
        if !output.stderr.is_empty() {
            warn!(status_code = ?code, stderr = %output.stderr, "git pull stderr");
        }
        if output.stdout.is_empty() && output.stderr.is_empty() {
            info!(status_code = ?code, "git pull completed with no output");
        }
        if !output.success() {
            warn!(status_code = ?code, "git pull exited unsuccessfully");
        }
        Ok(output)
    }

    /// Sleeps until each scheduled time and pulls, forever.
    pub async fn run(self) {
        let mut next = self.schedule.next_run_after(&self.clock.now_local());
        loop {
            let delay = delay_until(&self.clock.now_local(), &next);
            info!(
                next_run = %next.format("%Y-%m-%d %H:%M"),
                delay_secs = delay.as_secs(),
                "repository sync scheduled"
            );
            tokio::time::sleep(delay).await;

            if let Err(e) = self.pull_once().await {
                error!(error = %e, "repository sync failed");
            }
            // The sleep is monotonic, so the wall clock may still read just
            // before the slot that ran.
            next = self.schedule.run_following(&next, &self.clock.now_local());
        }
    }

    /// Starts the loop on its own task, or returns `None` when the schedule
    /// is disabled.
    #[must_use]
    pub fn spawn(self) -> Option<JoinHandle<()>> {
        if !self.schedule.enabled {
            info!("repository sync disabled");
            return None;
        }
        info!(
            hour = self.schedule.hour(),
            minute = self.schedule.minute(),
            repo_dir = %self.schedule.repo_dir.display(),
            "repository sync started"
        );
        Some(tokio::spawn(self.run()))
    }
}
