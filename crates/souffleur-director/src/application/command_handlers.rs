//! Command handlers for the director context.
//!
//! Each handler resolves the caller's play through the connection
//! registry, runs the command against the [`Play`] aggregate, drains the
//! resulting domain events, and turns them into deliveries. Handlers are
//! synchronous and must run under the gateway's lock so that every
//! transition is atomic with respect to the others.

use souffleur_core::aggregate::AggregateRoot;
use souffleur_core::clock::Clock;
use souffleur_core::command::Command;
use souffleur_core::connection::ConnectionId;
use souffleur_core::error::DomainError;
use souffleur_core::event::DomainEvent;
use tracing::{debug, info, instrument, warn};

use crate::application::query_handlers::director_status;
use crate::domain::aggregates::{Play, PlayId};
use crate::domain::commands::{ClaimDirector, Disconnect, JoinPlay, ReleaseDirector};
use crate::domain::credential::DirectorPassword;
use crate::domain::events::{DirectorEvent, DirectorEventKind, ReleaseReason};
use crate::domain::notifications::{
    Delivery, DirectorStatus, DirectorTakeover, DirectorUnset, MISSING_CREDENTIALS_MESSAGE,
    Notification, WRONG_PASSWORD_MESSAGE,
};
use crate::domain::stage::Stage;

/// Result of a handled `JoinPlay` command.
#[derive(Debug)]
pub struct JoinOutcome {
    /// Play the connection left, if it switched plays.
    pub left: Option<PlayId>,
    /// Play the connection is now a member of.
    pub joined: PlayId,
    /// Notifications to deliver, in order.
    pub deliveries: Vec<Delivery>,
}

/// Handles the `JoinPlay` command: records the new membership and answers
/// with a director snapshot. A connection that directed the play it is
/// leaving gives that play up first. A connection that never joined counts
/// as leaving the sentinel play, where its claims landed.
#[instrument(
    skip_all,
    fields(
        correlation_id = %command.correlation_id,
        connection_id = %command.connection_id,
        play_id = %command.play_id,
    )
)]
pub fn handle_join_play(command: &JoinPlay, stage: &mut Stage, clock: &dyn Clock) -> JoinOutcome {
    let mut deliveries = Vec::new();
    let previous = stage
        .connections
        .record_join(command.connection_id, command.play_id.clone());

    let old_play = previous.clone().unwrap_or_default();
    if old_play != command.play_id {
        deliveries.extend(release_play(
            stage,
            &old_play,
            command.connection_id,
            ReleaseReason::LeftPlay,
            command,
            clock,
        ));
    }
    // Room membership only exists after an explicit join.
    let left = previous.filter(|play_id| *play_id != command.play_id);

    stage.directory.open(&command.play_id);
    deliveries.push(Delivery::to_connection(
        command.connection_id,
        Notification::SetDirector(director_status(
            stage,
            &command.play_id,
            command.connection_id,
        )),
    ));

    debug!(
        correlation_id = %command.correlation_id,
        connection_id = %command.connection_id,
        play_id = %command.play_id,
        left = ?left,
        "connection joined play"
    );

    JoinOutcome {
        left,
        joined: command.play_id.clone(),
        deliveries,
    }
}

/// Handles the `ClaimDirector` command. A claim with a missing name or the
/// wrong password is answered to the caller only; a valid claim always
/// wins, displacing any sitting director.
#[instrument(
    skip_all,
    fields(correlation_id = %command.correlation_id, connection_id = %command.connection_id)
)]
pub fn handle_claim_director(
    command: &ClaimDirector,
    password: &DirectorPassword,
    stage: &mut Stage,
    clock: &dyn Clock,
) -> Vec<Delivery> {
    let name = match authorize(command, password) {
        Ok(name) => name,
        Err(err) => {
            warn!(error = %err, "director claim rejected");
            let message = match err {
                DomainError::Validation(_) => MISSING_CREDENTIALS_MESSAGE,
                DomainError::Unauthorized(_) => WRONG_PASSWORD_MESSAGE,
            };
            return vec![Delivery::to_connection(
                command.connection_id,
                Notification::SetDirector(DirectorStatus::rejected(message)),
            )];
        }
    };

    let play_id = stage.connections.play_of(command.connection_id);
    let play = stage.directory.open(&play_id);
    play.claim(name, command.connection_id, command.correlation_id, clock);
    drain(play)
}

/// Handles the `ReleaseDirector` command. Requests from anyone but the
/// sitting director are ignored without a reply.
#[instrument(
    skip_all,
    fields(correlation_id = %command.correlation_id, connection_id = %command.connection_id)
)]
pub fn handle_release_director(
    command: &ReleaseDirector,
    stage: &mut Stage,
    clock: &dyn Clock,
) -> Vec<Delivery> {
    let play_id = stage.connections.play_of(command.connection_id);
    let deliveries = release_play(
        stage,
        &play_id,
        command.connection_id,
        ReleaseReason::Requested,
        command,
        clock,
    );
    if deliveries.is_empty() {
        debug!(play_id = %play_id, "release from non-director ignored");
    }
    deliveries
}

/// Handles the `Disconnect` command: vacates the play the connection was
/// directing, then forgets the connection.
#[instrument(
    skip_all,
    fields(correlation_id = %command.correlation_id, connection_id = %command.connection_id)
)]
pub fn handle_disconnect(
    command: &Disconnect,
    stage: &mut Stage,
    clock: &dyn Clock,
) -> Vec<Delivery> {
    let play_id = stage.connections.play_of(command.connection_id);
    let deliveries = release_play(
        stage,
        &play_id,
        command.connection_id,
        ReleaseReason::Disconnected,
        command,
        clock,
    );
    stage.connections.forget(command.connection_id);
    deliveries
}

/// Checks the claim's inputs, returning the director name to install.
///
/// # Errors
///
/// Returns `DomainError::Validation` when name or password is missing or
/// empty, and `DomainError::Unauthorized` when the password is wrong.
fn authorize(command: &ClaimDirector, password: &DirectorPassword) -> Result<String, DomainError> {
    let name = command.name.as_deref().unwrap_or_default();
    let candidate = command.password.as_deref().unwrap_or_default();
    if name.is_empty() || candidate.is_empty() {
        return Err(DomainError::Validation(
            "name and password are required".into(),
        ));
    }
    if !password.verify(candidate) {
        return Err(DomainError::Unauthorized("wrong director password".into()));
    }
    Ok(name.to_owned())
}

fn release_play(
    stage: &mut Stage,
    play_id: &PlayId,
    connection_id: ConnectionId,
    reason: ReleaseReason,
    command: &dyn Command,
    clock: &dyn Clock,
) -> Vec<Delivery> {
    let Some(play) = stage.directory.get_mut(play_id) else {
        return Vec::new();
    };
    if !play.release(connection_id, reason, command.correlation_id(), clock) {
        return Vec::new();
    }
    drain(play)
}

fn drain(play: &mut Play) -> Vec<Delivery> {
    play.take_uncommitted_events()
        .iter()
        .flat_map(|event| {
            log_event(event);
            deliveries_for(event)
        })
        .collect()
}

fn log_event(event: &DirectorEvent) {
    let meta = event.metadata();
    info!(
        event_type = event.event_type(),
        play_id = %meta.aggregate_id,
        sequence_number = meta.sequence_number,
        correlation_id = %meta.correlation_id,
        "director state changed"
    );
}

/// Fans a director event out into per-audience notifications.
fn deliveries_for(event: &DirectorEvent) -> Vec<Delivery> {
    match &event.kind {
        DirectorEventKind::Claimed(claimed) => vec![
            Delivery::to_connection(
                claimed.connection_id,
                Notification::SetDirector(DirectorStatus::accepted(&claimed.director, true)),
            ),
            Delivery::to_play(
                claimed.play_id.clone(),
                vec![claimed.connection_id],
                Notification::SetDirector(DirectorStatus::accepted(&claimed.director, false)),
            ),
        ],
        DirectorEventKind::TakenOver(takeover) => {
            let notice = |is_director| {
                Notification::DirectorTakeover(DirectorTakeover {
                    previous_director: takeover.previous_director.clone(),
                    new_director: takeover.new_director.clone(),
                    is_director,
                })
            };
            let mut deliveries = Vec::with_capacity(3);
            let mut except = vec![takeover.new_connection_id];
            if takeover.previous_connection_id != takeover.new_connection_id {
                deliveries.push(Delivery::to_connection(
                    takeover.previous_connection_id,
                    notice(false),
                ));
                except.push(takeover.previous_connection_id);
            }
            deliveries.push(Delivery::to_connection(
                takeover.new_connection_id,
                notice(true),
            ));
            deliveries.push(Delivery::to_play(
                takeover.play_id.clone(),
                except,
                notice(false),
            ));
            deliveries
        }
        DirectorEventKind::Released(released) => {
            let except = match released.reason {
                ReleaseReason::Requested => Vec::new(),
                ReleaseReason::Disconnected | ReleaseReason::LeftPlay => {
                    vec![released.previous_connection_id]
                }
            };
            vec![Delivery::to_play(
                released.play_id.clone(),
                except,
                Notification::UnsetDirector(DirectorUnset::new(&released.previous_director)),
            )]
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use souffleur_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;
    use crate::domain::aggregates::DEFAULT_PLAY_ID;
    use crate::domain::notifications::{Audience, NO_DIRECTOR};

    const SECRET: &str = "vorhang";

    fn clock() -> FixedClock {
        FixedClock(Utc.with_ymd_and_hms(2026, 3, 14, 19, 30, 0).unwrap())
    }

    fn password() -> DirectorPassword {
        DirectorPassword::new(SECRET)
    }

    fn join(stage: &mut Stage, connection_id: ConnectionId, play: &str) -> JoinOutcome {
        let command = JoinPlay {
            correlation_id: Uuid::new_v4(),
            connection_id,
            play_id: PlayId::from(play),
        };
        handle_join_play(&command, stage, &clock())
    }

    fn claim(
        stage: &mut Stage,
        connection_id: ConnectionId,
        name: &str,
        secret: &str,
    ) -> Vec<Delivery> {
        let command = ClaimDirector {
            correlation_id: Uuid::new_v4(),
            connection_id,
            name: Some(name.to_owned()),
            password: Some(secret.to_owned()),
        };
        handle_claim_director(&command, &password(), stage, &clock())
    }

    fn release(stage: &mut Stage, connection_id: ConnectionId) -> Vec<Delivery> {
        let command = ReleaseDirector {
            correlation_id: Uuid::new_v4(),
            connection_id,
        };
        handle_release_director(&command, stage, &clock())
    }

    fn disconnect(stage: &mut Stage, connection_id: ConnectionId) -> Vec<Delivery> {
        let command = Disconnect {
            correlation_id: Uuid::new_v4(),
            connection_id,
        };
        handle_disconnect(&command, stage, &clock())
    }

    fn assert_invariant(stage: &Stage, play: &str) {
        let play = stage.directory.get(&PlayId::from(play)).unwrap();
        if let Some(director) = play.director() {
            assert!(!director.name.is_empty());
        }
    }

    #[test]
    fn test_join_sends_vacant_snapshot_to_joiner_only() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();

        // Act
        let outcome = join(&mut stage, c1, "x");

        // Assert
        assert_eq!(outcome.left, None);
        assert_eq!(outcome.joined, PlayId::from("x"));
        assert_eq!(
            outcome.deliveries,
            vec![Delivery::to_connection(
                c1,
                Notification::SetDirector(DirectorStatus::accepted(NO_DIRECTOR, false)),
            )]
        );
        assert_eq!(stage.directory.len(), 1);
    }

    #[test]
    fn test_claim_on_vacant_play_confirms_caller_and_informs_others() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        join(&mut stage, c1, "x");

        // Act
        let deliveries = claim(&mut stage, c1, "Alice", SECRET);

        // Assert
        assert_eq!(
            deliveries,
            vec![
                Delivery::to_connection(
                    c1,
                    Notification::SetDirector(DirectorStatus::accepted("Alice", true)),
                ),
                Delivery::to_play(
                    PlayId::from("x"),
                    vec![c1],
                    Notification::SetDirector(DirectorStatus::accepted("Alice", false)),
                ),
            ]
        );
        assert!(
            deliveries
                .iter()
                .all(|d| !matches!(d.notification, Notification::DirectorTakeover(_)))
        );
        assert!(stage.directory.is_director(&PlayId::from("x"), c1));
        assert_invariant(&stage, "x");
    }

    #[test]
    fn test_claim_on_occupied_play_emits_three_takeover_notices() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();
        join(&mut stage, c1, "x");
        join(&mut stage, c2, "x");
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let deliveries = claim(&mut stage, c2, "Bob", SECRET);

        // Assert
        let takeover = |is_director| {
            Notification::DirectorTakeover(DirectorTakeover {
                previous_director: "Alice".into(),
                new_director: "Bob".into(),
                is_director,
            })
        };
        assert_eq!(
            deliveries,
            vec![
                Delivery::to_connection(c1, takeover(false)),
                Delivery::to_connection(c2, takeover(true)),
                Delivery::to_play(PlayId::from("x"), vec![c2, c1], takeover(false)),
            ]
        );
        let director = stage.directory.director_of(&PlayId::from("x")).unwrap();
        assert_eq!(director.name, "Bob");
        assert_eq!(director.connection_id, c2);
    }

    #[test]
    fn test_reclaim_by_sitting_director_renames_without_displaced_notice() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        join(&mut stage, c1, "x");
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let deliveries = claim(&mut stage, c1, "Alicia", SECRET);

        // Assert
        assert_eq!(deliveries.len(), 2);
        assert_eq!(deliveries[0].audience, Audience::Connection(c1));
        assert_eq!(
            deliveries[1].audience,
            Audience::Play {
                play_id: PlayId::from("x"),
                except: vec![c1],
            }
        );
        assert_eq!(
            stage.directory.director_of(&PlayId::from("x")).unwrap().name,
            "Alicia"
        );
    }

    #[test]
    fn test_claim_with_wrong_password_answers_caller_only() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        join(&mut stage, c1, "x");

        // Act
        let deliveries = claim(&mut stage, c1, "Alice", "falsch");

        // Assert
        assert_eq!(
            deliveries,
            vec![Delivery::to_connection(
                c1,
                Notification::SetDirector(DirectorStatus::rejected("Falsches Passwort")),
            )]
        );
        assert!(stage.directory.director_of(&PlayId::from("x")).is_none());
    }

    #[test]
    fn test_claim_with_wrong_password_leaves_sitting_director() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();
        join(&mut stage, c1, "x");
        join(&mut stage, c2, "x");
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let deliveries = claim(&mut stage, c2, "Mallory", "falsch");

        // Assert
        assert_eq!(deliveries.len(), 1);
        assert_eq!(deliveries[0].audience, Audience::Connection(c2));
        assert!(stage.directory.is_director(&PlayId::from("x"), c1));
    }

    #[test]
    fn test_claim_with_missing_fields_is_a_validation_failure() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        join(&mut stage, c1, "x");
        let missing_password = ClaimDirector {
            correlation_id: Uuid::new_v4(),
            connection_id: c1,
            name: Some("Alice".into()),
            password: None,
        };

        // Act
        let empty_name = claim(&mut stage, c1, "", SECRET);
        let no_password =
            handle_claim_director(&missing_password, &password(), &mut stage, &clock());

        // Assert
        let expected = vec![Delivery::to_connection(
            c1,
            Notification::SetDirector(DirectorStatus::rejected("Name und Passwort erforderlich")),
        )];
        assert_eq!(empty_name, expected);
        assert_eq!(no_password, expected);
        assert!(stage.directory.director_of(&PlayId::from("x")).is_none());
    }

    #[test]
    fn test_claim_without_join_lands_in_sentinel_play() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();

        // Act
        claim(&mut stage, c1, "Alice", SECRET);

        // Assert
        assert!(stage.directory.is_director(&PlayId::default(), c1));
    }

    #[test]
    fn test_joining_after_unjoined_claim_vacates_sentinel_play() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        let watcher = ConnectionId::new();
        join(&mut stage, watcher, DEFAULT_PLAY_ID);
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let outcome = join(&mut stage, c1, "x");
        let on_disconnect = disconnect(&mut stage, c1);

        // Assert
        let sentinel = PlayId::default();
        assert_eq!(outcome.left, None);
        assert_eq!(
            outcome.deliveries[0],
            Delivery::to_play(
                sentinel.clone(),
                vec![c1],
                Notification::UnsetDirector(DirectorUnset::new("Alice")),
            )
        );
        assert!(on_disconnect.is_empty());
        assert!(stage.directory.director_of(&sentinel).is_none());
        assert_eq!(stage.directory.directed_count(), 0);
    }

    #[test]
    fn test_release_by_non_director_emits_nothing() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();
        join(&mut stage, c1, "x");
        join(&mut stage, c2, "x");
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let deliveries = release(&mut stage, c2);

        // Assert
        assert!(deliveries.is_empty());
        assert!(stage.directory.is_director(&PlayId::from("x"), c1));
    }

    #[test]
    fn test_release_by_director_notifies_whole_play() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        join(&mut stage, c1, "x");
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let deliveries = release(&mut stage, c1);

        // Assert
        assert_eq!(
            deliveries,
            vec![Delivery::to_play(
                PlayId::from("x"),
                vec![],
                Notification::UnsetDirector(DirectorUnset::new("Alice")),
            )]
        );
        assert!(stage.directory.director_of(&PlayId::from("x")).is_none());
        assert_invariant(&stage, "x");
    }

    #[test]
    fn test_disconnect_of_director_vacates_play_for_remaining_members() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        join(&mut stage, c1, "x");
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let deliveries = disconnect(&mut stage, c1);

        // Assert
        assert_eq!(
            deliveries,
            vec![Delivery::to_play(
                PlayId::from("x"),
                vec![c1],
                Notification::UnsetDirector(DirectorUnset::new("Alice")),
            )]
        );
        assert!(stage.directory.director_of(&PlayId::from("x")).is_none());
        assert!(!stage.connections.has_joined(c1));
    }

    #[test]
    fn test_disconnect_of_non_director_emits_nothing() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();
        join(&mut stage, c1, "x");
        join(&mut stage, c2, "x");
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let deliveries = disconnect(&mut stage, c2);

        // Assert
        assert!(deliveries.is_empty());
        assert!(stage.directory.is_director(&PlayId::from("x"), c1));
        assert!(!stage.connections.has_joined(c2));
    }

    #[test]
    fn test_disconnect_of_unknown_connection_is_harmless() {
        let mut stage = Stage::new();

        let deliveries = disconnect(&mut stage, ConnectionId::new());

        assert!(deliveries.is_empty());
        assert!(stage.directory.is_empty());
    }

    #[test]
    fn test_switching_plays_releases_previous_directorship() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        join(&mut stage, c1, "a");
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let outcome = join(&mut stage, c1, "b");

        // Assert
        assert_eq!(outcome.left, Some(PlayId::from("a")));
        assert_eq!(
            outcome.deliveries[0],
            Delivery::to_play(
                PlayId::from("a"),
                vec![c1],
                Notification::UnsetDirector(DirectorUnset::new("Alice")),
            )
        );
        assert_eq!(
            outcome.deliveries[1],
            Delivery::to_connection(
                c1,
                Notification::SetDirector(DirectorStatus::accepted(NO_DIRECTOR, false)),
            )
        );
        assert!(stage.directory.director_of(&PlayId::from("a")).is_none());
    }

    #[test]
    fn test_rejoining_same_play_keeps_directorship() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        join(&mut stage, c1, "x");
        claim(&mut stage, c1, "Alice", SECRET);

        // Act
        let outcome = join(&mut stage, c1, "x");

        // Assert
        assert_eq!(outcome.left, None);
        assert_eq!(
            outcome.deliveries,
            vec![Delivery::to_connection(
                c1,
                Notification::SetDirector(DirectorStatus::accepted("Alice", true)),
            )]
        );
    }

    #[test]
    fn test_claims_in_one_play_never_address_another() {
        // Arrange
        let mut stage = Stage::new();
        let c1 = ConnectionId::new();
        let c2 = ConnectionId::new();
        join(&mut stage, c1, "a");
        join(&mut stage, c2, "b");

        // Act
        let deliveries = claim(&mut stage, c1, "Alice", SECRET);

        // Assert
        assert!(
            deliveries
                .iter()
                .all(|d| !d.audience.includes(c2, &PlayId::from("b")))
        );
        assert!(stage.directory.director_of(&PlayId::from("b")).is_none());
    }
}
