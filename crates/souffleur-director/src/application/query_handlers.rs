//! Query handlers for the director context.

use souffleur_core::connection::ConnectionId;

use crate::domain::aggregates::PlayId;
use crate::domain::notifications::{DirectorStatus, NO_DIRECTOR};
use crate::domain::stage::Stage;

/// Point-in-time counts over the coordination state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageSummary {
    /// Connections that have joined a play.
    pub joined_connections: usize,
    /// Plays referenced so far.
    pub plays: usize,
    /// Plays that currently have a director.
    pub directed_plays: usize,
}

/// Director snapshot of `play_id` as seen by `connection_id`: the
/// director's name (or [`NO_DIRECTOR`]) and whether the viewer holds it.
#[must_use]
pub fn director_status(
    stage: &Stage,
    play_id: &PlayId,
    connection_id: ConnectionId,
) -> DirectorStatus {
    match stage.directory.director_of(play_id) {
        Some(director) => {
            DirectorStatus::accepted(&director.name, director.connection_id == connection_id)
        }
        None => DirectorStatus::accepted(NO_DIRECTOR, false),
    }
}

/// Summarises the coordination state.
#[must_use]
pub fn stage_summary(stage: &Stage) -> StageSummary {
    StageSummary {
        joined_connections: stage.connections.len(),
        plays: stage.directory.len(),
        directed_plays: stage.directory.directed_count(),
    }
}
