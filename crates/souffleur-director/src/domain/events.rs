//! Domain events for the director context.

use serde::{Deserialize, Serialize};
use souffleur_core::connection::ConnectionId;
use souffleur_core::event::{DomainEvent, EventMetadata};

use super::aggregates::PlayId;

/// Emitted when a vacant play gets a director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorClaimed {
    /// The play that was claimed.
    pub play_id: PlayId,
    /// Display name of the new director.
    pub director: String,
    /// Connection now holding director status.
    pub connection_id: ConnectionId,
}

/// Emitted when a valid claim displaces a sitting director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorTakenOver {
    /// The play whose director changed.
    pub play_id: PlayId,
    /// Display name of the displaced director.
    pub previous_director: String,
    /// Connection that lost director status.
    pub previous_connection_id: ConnectionId,
    /// Display name of the new director.
    pub new_director: String,
    /// Connection now holding director status.
    pub new_connection_id: ConnectionId,
}

/// Why a play lost its director.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReleaseReason {
    /// The director asked to step down.
    Requested,
    /// The director's transport went away.
    Disconnected,
    /// The director joined a different play.
    LeftPlay,
}

/// Emitted when a play reverts to having no director.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectorReleased {
    /// The play that is now vacant.
    pub play_id: PlayId,
    /// Display name of the released director.
    pub previous_director: String,
    /// Connection that held director status.
    pub previous_connection_id: ConnectionId,
    /// What triggered the release.
    pub reason: ReleaseReason,
}

/// Event type identifier for [`DirectorClaimed`].
pub const DIRECTOR_CLAIMED_EVENT_TYPE: &str = "director.claimed";

/// Event type identifier for [`DirectorTakenOver`].
pub const DIRECTOR_TAKEN_OVER_EVENT_TYPE: &str = "director.taken_over";

/// Event type identifier for [`DirectorReleased`].
pub const DIRECTOR_RELEASED_EVENT_TYPE: &str = "director.released";

/// Event payload variants for the director context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DirectorEventKind {
    /// A vacant play got a director.
    Claimed(DirectorClaimed),
    /// A sitting director was displaced.
    TakenOver(DirectorTakenOver),
    /// A play became vacant.
    Released(DirectorReleased),
}

impl DirectorEventKind {
    /// Event type name for this payload.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Claimed(_) => DIRECTOR_CLAIMED_EVENT_TYPE,
            Self::TakenOver(_) => DIRECTOR_TAKEN_OVER_EVENT_TYPE,
            Self::Released(_) => DIRECTOR_RELEASED_EVENT_TYPE,
        }
    }
}

/// Domain event envelope for the director context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirectorEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: DirectorEventKind,
}

impl DomainEvent for DirectorEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }
}
