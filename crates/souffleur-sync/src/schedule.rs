//! When and where the repository sync runs.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Days, TimeZone};

use crate::error::SyncError;

/// Default daily run time.
pub const DEFAULT_HOUR: u32 = 3;
/// Default daily run minute.
pub const DEFAULT_MINUTE: u32 = 0;
/// Upper bound on a single `git pull`.
pub const PULL_TIMEOUT: Duration = Duration::from_secs(300);

const MIN_DELAY: Duration = Duration::from_secs(1);

/// Daily sync configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSchedule {
    /// Whether the scheduler runs at all.
    pub enabled: bool,
    hour: u32,
    minute: u32,
    /// Checkout to pull.
    pub repo_dir: PathBuf,
    /// Upper bound on one pull.
    pub timeout: Duration,
}

impl SyncSchedule {
    /// Builds a schedule that pulls `repo_dir` daily at `hour:minute` local
    /// time.
    ///
    /// # Errors
    ///
    /// Returns `SyncError::InvalidTime` if `hour` is not below 24 or
    /// `minute` is not below 60.
    pub fn daily_at(
        enabled: bool,
        hour: u32,
        minute: u32,
        repo_dir: impl Into<PathBuf>,
    ) -> Result<Self, SyncError> {
        if hour >= 24 || minute >= 60 {
            return Err(SyncError::InvalidTime { hour, minute });
        }
        Ok(Self {
            enabled,
            hour,
            minute,
            repo_dir: repo_dir.into(),
            timeout: PULL_TIMEOUT,
        })
    }

    /// Configured hour.
    #[must_use]
    pub fn hour(&self) -> u32 {
        self.hour
    }

    /// Configured minute.
    #[must_use]
    pub fn minute(&self) -> u32 {
        self.minute
    }

    /// The first occurrence of the configured wall-clock time strictly
    /// after `now`: later today, otherwise tomorrow. Days on which the time
    /// does not exist (DST gaps) are skipped.
    #[must_use]
    pub fn next_run_after<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> DateTime<Tz> {
        let tz = now.timezone();
        let today = now.date_naive();
        for offset in 0..=2 {
            let Some(date) = today.checked_add_days(Days::new(offset)) else {
                continue;
            };
            let Some(naive) = date.and_hms_opt(self.hour, self.minute, 0) else {
                continue;
            };
            if let Some(candidate) = tz.from_local_datetime(&naive).earliest() {
                if candidate > *now {
                    return candidate;
                }
            }
        }
        now.clone() + chrono::TimeDelta::days(1)
    }

    /// How long to sleep from `now` until the next run, never less than one
    /// second.
    #[must_use]
    pub fn delay_until_next_run<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Duration {
        delay_until(now, &self.next_run_after(now))
    }

    /// The run that follows `previous`: the next slot after it, or the next
    /// slot after `now` if the wall clock has since jumped past that.
    #[must_use]
    pub fn run_following<Tz: TimeZone>(
        &self,
        previous: &DateTime<Tz>,
        now: &DateTime<Tz>,
    ) -> DateTime<Tz> {
        let after_previous = self.next_run_after(previous);
        let after_now = self.next_run_after(now);
        if after_now > after_previous {
            after_now
        } else {
            after_previous
        }
    }
}

/// How long to sleep from `now` until `target`, never less than one second.
#[must_use]
pub fn delay_until<Tz: TimeZone>(now: &DateTime<Tz>, target: &DateTime<Tz>) -> Duration {
    target
        .clone()
        .signed_duration_since(now.clone())
        .to_std()
        .unwrap_or(MIN_DELAY)
        .max(MIN_DELAY)
}
