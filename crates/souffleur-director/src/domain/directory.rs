//! Play directory: the director status of every play seen so far.

use std::collections::HashMap;

use souffleur_core::connection::ConnectionId;

use super::aggregates::{Director, Play, PlayId};

/// Holds one [`Play`] aggregate per play id. Entries are created on first
/// reference and kept for the life of the process.
#[derive(Debug, Default)]
pub struct PlayDirectory {
    plays: HashMap<PlayId, Play>,
}

impl PlayDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the play, creating a vacant entry if it was never seen.
    pub fn open(&mut self, play_id: &PlayId) -> &mut Play {
        self.plays
            .entry(play_id.clone())
            .or_insert_with(|| Play::new(play_id.clone()))
    }

    /// Returns the play if it exists.
    #[must_use]
    pub fn get(&self, play_id: &PlayId) -> Option<&Play> {
        self.plays.get(play_id)
    }

    /// Returns the play mutably if it exists.
    pub fn get_mut(&mut self, play_id: &PlayId) -> Option<&mut Play> {
        self.plays.get_mut(play_id)
    }

    /// Returns the play's director; unknown plays have none.
    #[must_use]
    pub fn director_of(&self, play_id: &PlayId) -> Option<&Director> {
        self.plays.get(play_id).and_then(Play::director)
    }

    /// Whether `connection_id` directs `play_id`.
    #[must_use]
    pub fn is_director(&self, play_id: &PlayId, connection_id: ConnectionId) -> bool {
        self.plays
            .get(play_id)
            .is_some_and(|play| play.is_directed_by(connection_id))
    }

    /// Number of plays referenced so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plays.len()
    }

    /// Whether no play has been referenced yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plays.is_empty()
    }

    /// Number of plays that currently have a director.
    #[must_use]
    pub fn directed_count(&self) -> usize {
        self.plays
            .values()
            .filter(|play| play.director().is_some())
            .count()
    }
}
