//! Broadcast groups, one per play.

use std::collections::{BTreeSet, HashMap};

use souffleur_core::connection::ConnectionId;
use souffleur_director::domain::aggregates::PlayId;

/// Which connections receive a play's broadcasts.
#[derive(Debug, Default)]
pub struct Rooms {
    members: HashMap<PlayId, BTreeSet<ConnectionId>>,
}

impl Rooms {
    /// Creates an empty set of rooms.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `connection_id` to the play's room. Returns `false` if it was
    /// already a member.
    pub fn join(&mut self, play_id: &PlayId, connection_id: ConnectionId) -> bool {
        self.members
            .entry(play_id.clone())
            .or_default()
            .insert(connection_id)
    }

    /// Removes `connection_id` from the play's room, dropping the room once
    /// it is empty. Returns `false` if it was not a member.
    pub fn leave(&mut self, play_id: &PlayId, connection_id: ConnectionId) -> bool {
        let Some(room) = self.members.get_mut(play_id) else {
            return false;
        };
        let removed = room.remove(&connection_id);
        if room.is_empty() {
            self.members.remove(play_id);
        }
        removed
    }

    /// Members of the play's room, in a stable order.
    pub fn members(&self, play_id: &PlayId) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members
            .get(play_id)
            .into_iter()
            .flat_map(|room| room.iter().copied())
    }

    /// Number of non-empty rooms.
    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether every room is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
