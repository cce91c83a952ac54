//! Connection registry: which play each live connection belongs to.

use std::collections::HashMap;

use souffleur_core::connection::ConnectionId;

use super::aggregates::PlayId;

/// Maps live connections to their current play. Lookups never fail; a
/// connection that has not joined anything belongs to the sentinel play.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
    plays: HashMap<ConnectionId, PlayId>,
}

impl ConnectionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `connection_id` as a member of `play_id`, returning the play
    /// it was previously recorded in, if any. Moving the connection between
    /// broadcast groups is the caller's job.
    pub fn record_join(&mut self, connection_id: ConnectionId, play_id: PlayId) -> Option<PlayId> {
        self.plays.insert(connection_id, play_id)
    }

    /// Returns the play `connection_id` belongs to, or the sentinel play.
    #[must_use]
    pub fn play_of(&self, connection_id: ConnectionId) -> PlayId {
        self.plays.get(&connection_id).cloned().unwrap_or_default()
    }

    /// Whether `connection_id` has joined a play.
    #[must_use]
    pub fn has_joined(&self, connection_id: ConnectionId) -> bool {
        self.plays.contains_key(&connection_id)
    }

    /// Drops all state for `connection_id`. Safe to call repeatedly.
    pub fn forget(&mut self, connection_id: ConnectionId) -> Option<PlayId> {
        self.plays.remove(&connection_id)
    }

    /// Number of connections that have joined a play.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plays.len()
    }

    /// Whether no connection has joined a play.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }
}
