//! Aggregate roots for the director context.

use std::fmt;

use serde::{Deserialize, Serialize};
use souffleur_core::aggregate::AggregateRoot;
use souffleur_core::clock::Clock;
use souffleur_core::connection::ConnectionId;
use souffleur_core::event::EventMetadata;
use uuid::Uuid;

use super::events::{
    DirectorClaimed, DirectorEvent, DirectorEventKind, DirectorReleased, DirectorTakenOver,
    ReleaseReason,
};

/// Play identifier used when a client does not name one.
pub const DEFAULT_PLAY_ID: &str = "default";

/// Client-supplied key of a play.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayId(String);

impl PlayId {
    /// Wraps a play key.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for PlayId {
    fn default() -> Self {
        Self(DEFAULT_PLAY_ID.to_owned())
    }
}

impl fmt::Display for PlayId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for PlayId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// The connection currently directing a play, with its display name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Director {
    /// Display name shown to the other participants.
    pub name: String,
    /// Owning connection.
    pub connection_id: ConnectionId,
}

/// The aggregate root for one play's director status.
///
/// A play is either vacant (`director == None`) or occupied; name and
/// connection are stored together so neither can exist without the other.
#[derive(Debug)]
pub struct Play {
    /// Aggregate identifier.
    pub id: PlayId,
    /// Current version (event count).
    pub(crate) version: u64,
    /// Sitting director, if any.
    pub(crate) director: Option<Director>,
    /// Events produced since the last drain.
    uncommitted_events: Vec<DirectorEvent>,
}

impl Play {
    /// Creates a vacant play.
    #[must_use]
    pub fn new(id: PlayId) -> Self {
        Self {
            id,
            version: 0,
            director: None,
            uncommitted_events: Vec::new(),
        }
    }

    /// Returns the sitting director, if any.
    #[must_use]
    pub fn director(&self) -> Option<&Director> {
        self.director.as_ref()
    }

    /// Whether `connection_id` holds director status for this play.
    #[must_use]
    pub fn is_directed_by(&self, connection_id: ConnectionId) -> bool {
        self.director
            .as_ref()
            .is_some_and(|d| d.connection_id == connection_id)
    }

    /// Installs `name`/`connection_id` as director, producing `DirectorClaimed`
    /// on a vacant play or `DirectorTakenOver` on an occupied one. The newest
    /// claim always wins.
    pub fn claim(
        &mut self,
        name: String,
        connection_id: ConnectionId,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) {
        let kind = match self.director.as_ref() {
            None => DirectorEventKind::Claimed(DirectorClaimed {
                play_id: self.id.clone(),
                director: name,
                connection_id,
            }),
            Some(previous) => DirectorEventKind::TakenOver(DirectorTakenOver {
                play_id: self.id.clone(),
                previous_director: previous.name.clone(),
                previous_connection_id: previous.connection_id,
                new_director: name,
                new_connection_id: connection_id,
            }),
        };
        self.record(kind, correlation_id, clock);
    }

    /// Vacates the play if `connection_id` is its director. Returns `false`
    /// and records nothing for any other connection.
    pub fn release(
        &mut self,
        connection_id: ConnectionId,
        reason: ReleaseReason,
        correlation_id: Uuid,
        clock: &dyn Clock,
    ) -> bool {
        let Some(current) = self.director.as_ref() else {
            return false;
        };
        if current.connection_id != connection_id {
            return false;
        }
        let kind = DirectorEventKind::Released(DirectorReleased {
            play_id: self.id.clone(),
            previous_director: current.name.clone(),
            previous_connection_id: current.connection_id,
            reason,
        });
        self.record(kind, correlation_id, clock);
        true
    }

    fn record(&mut self, kind: DirectorEventKind, correlation_id: Uuid, clock: &dyn Clock) {
        let event = DirectorEvent {
            metadata: EventMetadata {
                event_id: Uuid::new_v4(),
                event_type: kind.event_type().to_owned(),
                aggregate_id: self.id.to_string(),
                sequence_number: self.version + 1,
                correlation_id,
                occurred_at: clock.now(),
            },
            kind,
        };
        self.apply(&event);
        self.uncommitted_events.push(event);
    }
}

impl AggregateRoot for Play {
    type Id = PlayId;
    type Event = DirectorEvent;

    fn aggregate_id(&self) -> &PlayId {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }

    fn apply(&mut self, event: &Self::Event) {
        match &event.kind {
            DirectorEventKind::Claimed(payload) => {
                self.director = Some(Director {
                    name: payload.director.clone(),
                    connection_id: payload.connection_id,
                });
            }
            DirectorEventKind::TakenOver(payload) => {
                self.director = Some(Director {
                    name: payload.new_director.clone(),
                    connection_id: payload.new_connection_id,
                });
            }
            DirectorEventKind::Released(_) => {
                self.director = None;
            }
        }
        self.version += 1;
    }

    fn uncommitted_events(&self) -> &[Self::Event] {
        &self.uncommitted_events
    }

    fn take_uncommitted_events(&mut self) -> Vec<Self::Event> {
        std::mem::take(&mut self.uncommitted_events)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use souffleur_test_support::FixedClock;

    use super::*;

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 3, 14, 19, 30, 0).unwrap())
    }

    #[test]
    fn test_default_play_id_is_sentinel() {
        assert_eq!(PlayId::default().as_str(), "default");
    }

    #[test]
    fn test_claim_on_vacant_play_records_director_claimed() {
        // Arrange
        let mut play = Play::new(PlayId::from("hamlet"));
        let alice = ConnectionId::new();
        let correlation_id = Uuid::new_v4();

        // Act
        play.claim("Alice".into(), alice, correlation_id, &clock());

        // Assert
        assert!(play.is_directed_by(alice));
        assert_eq!(play.version(), 1);
        let events = play.take_uncommitted_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].metadata.event_type, "director.claimed");
        assert_eq!(events[0].metadata.aggregate_id, "hamlet");
        assert_eq!(events[0].metadata.sequence_number, 1);
        assert_eq!(events[0].metadata.correlation_id, correlation_id);
        assert_eq!(events[0].metadata.occurred_at, clock().0);
        assert!(play.uncommitted_events().is_empty());
    }

    #[test]
    fn test_claim_on_occupied_play_records_takeover_with_both_names() {
        // Arrange
        let mut play = Play::new(PlayId::default());
        let alice = ConnectionId::new();
        let bob = ConnectionId::new();
        play.claim("Alice".into(), alice, Uuid::new_v4(), &clock());
        play.take_uncommitted_events();

        // Act
        play.claim("Bob".into(), bob, Uuid::new_v4(), &clock());

        // Assert
        assert!(play.is_directed_by(bob));
        assert!(!play.is_directed_by(alice));
        let events = play.take_uncommitted_events();
        let DirectorEventKind::TakenOver(takeover) = &events[0].kind else {
            panic!("expected takeover, got {:?}", events[0].kind);
        };
        assert_eq!(takeover.previous_director, "Alice");
        assert_eq!(takeover.previous_connection_id, alice);
        assert_eq!(takeover.new_director, "Bob");
        assert_eq!(takeover.new_connection_id, bob);
        assert_eq!(events[0].metadata.sequence_number, 2);
    }

    #[test]
    fn test_release_by_director_vacates_play() {
        // Arrange
        let mut play = Play::new(PlayId::default());
        let alice = ConnectionId::new();
        play.claim("Alice".into(), alice, Uuid::new_v4(), &clock());
        play.take_uncommitted_events();

        // Act
        let released = play.release(alice, ReleaseReason::Requested, Uuid::new_v4(), &clock());

        // Assert
        assert!(released);
        assert!(play.director().is_none());
        let events = play.take_uncommitted_events();
        let DirectorEventKind::Released(payload) = &events[0].kind else {
            panic!("expected release, got {:?}", events[0].kind);
        };
        assert_eq!(payload.previous_director, "Alice");
        assert_eq!(payload.reason, ReleaseReason::Requested);
    }

    #[test]
    fn test_release_by_other_connection_is_ignored() {
        // Arrange
        let mut play = Play::new(PlayId::default());
        let alice = ConnectionId::new();
        play.claim("Alice".into(), alice, Uuid::new_v4(), &clock());
        play.take_uncommitted_events();

        // Act
        let released = play.release(
            ConnectionId::new(),
            ReleaseReason::Requested,
            Uuid::new_v4(),
            &clock(),
        );

        // Assert
        assert!(!released);
        assert!(play.is_directed_by(alice));
        assert!(play.uncommitted_events().is_empty());
        assert_eq!(play.version(), 1);
    }

    #[test]
    fn test_release_on_vacant_play_is_ignored() {
        let mut play = Play::new(PlayId::default());

        let released = play.release(
            ConnectionId::new(),
            ReleaseReason::Disconnected,
            Uuid::new_v4(),
            &clock(),
        );

        assert!(!released);
        assert_eq!(play.version(), 0);
    }
}
