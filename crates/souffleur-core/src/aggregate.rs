//! Aggregate root abstraction.

use crate::event::DomainEvent;

/// Trait for in-memory aggregate roots that record the events their
/// mutations produce.
pub trait AggregateRoot: Send + Sync {
    /// Identifier type of the aggregate.
    type Id;

    /// The event type this aggregate produces and consumes.
    type Event: DomainEvent;

    /// Returns the aggregate identifier.
    fn aggregate_id(&self) -> &Self::Id;

    /// Returns the current version (number of events applied).
    fn version(&self) -> u64;

    /// Apply an event to mutate internal state.
    fn apply(&mut self, event: &Self::Event);

    /// Returns events produced since the last drain.
    fn uncommitted_events(&self) -> &[Self::Event];

    /// Removes and returns the events produced since the last drain.
    fn take_uncommitted_events(&mut self) -> Vec<Self::Event>;
}
