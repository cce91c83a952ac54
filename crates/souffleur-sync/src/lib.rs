//! Souffleur: daily repository sync scheduler.
//!
//! Pulls the deployment's git checkout once a day at a configured local
//! time. The job runs on its own tokio task and never touches play or
//! connection state; its failures are logged and dropped.

pub mod error;
pub mod runner;
pub mod schedule;
pub mod scheduler;

pub use error::SyncError;
pub use runner::TokioProcessRunner;
pub use schedule::SyncSchedule;
pub use scheduler::RepositorySync;
