//! Shared test doubles for the Souffleur rehearsal coordinator.

mod clock;
mod process;

pub use clock::FixedClock;
pub use process::{FailingProcessRunner, FailureKind, RecordingProcessRunner};
