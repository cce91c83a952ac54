//! Session gateway: connection lifecycle, event dispatch and fan-out.
//!
//! Every inbound event is handled under one lock so that the director
//! election for a play is a single critical section. Deliveries are pushed
//! onto each connection's outbox while the lock is still held, which keeps
//! per-connection order identical to the order in which events were applied.

pub mod protocol;
pub mod rooms;

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use souffleur_core::clock::Clock;
use souffleur_core::connection::ConnectionId;
use souffleur_director::application::command_handlers::{
    handle_claim_director, handle_disconnect, handle_join_play, handle_release_director,
};
use souffleur_director::application::marker_relay::handle_set_marker;
use souffleur_director::application::query_handlers::{StageSummary, stage_summary};
use souffleur_director::domain::commands::{
    ClaimDirector, Disconnect, JoinPlay, ReleaseDirector, SetMarker,
};
use souffleur_director::domain::credential::DirectorPassword;
use souffleur_director::domain::notifications::{Audience, Delivery, Notification};
use souffleur_director::domain::stage::Stage;
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info, warn};
use uuid::Uuid;

use self::protocol::ClientEvent;
use self::rooms::Rooms;

/// Outbox of one connection.
pub type NotificationSender = UnboundedSender<Notification>;

#[derive(Debug, Default)]
struct GatewayState {
    stage: Stage,
    rooms: Rooms,
    outboxes: HashMap<ConnectionId, NotificationSender>,
}

/// Owns all coordination state and the outboxes of live connections.
pub struct SessionGateway {
    state: Mutex<GatewayState>,
    password: DirectorPassword,
    clock: Arc<dyn Clock>,
}

impl SessionGateway {
    /// Creates a gateway that accepts `password` for director claims.
    #[must_use]
    pub fn new(password: DirectorPassword, clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(GatewayState::default()),
            password,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, GatewayState> {
        // Handlers never leave the state half-updated, so a panic elsewhere
        // does not invalidate it.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Registers a new connection. Nothing is sent until it joins a play.
    pub fn connect(&self, outbox: NotificationSender) -> ConnectionId {
        let connection_id = ConnectionId::new();
        let mut state = self.lock();
        state.outboxes.insert(connection_id, outbox);
        info!(
            connection_id = %connection_id,
            connections = state.outboxes.len(),
            "client connected"
        );
        connection_id
    }

    /// Applies one client event on behalf of `connection_id`.
    pub fn dispatch(&self, connection_id: ConnectionId, event: ClientEvent) {
        let correlation_id = Uuid::new_v4();
        let clock = self.clock.as_ref();
        let mut guard = self.lock();
        let state = &mut *guard;
        if !state.outboxes.contains_key(&connection_id) {
            debug!(
                connection_id = %connection_id,
                event = event.event_name(),
                "event from unknown connection dropped"
            );
            return;
        }

        let deliveries = match event {
            ClientEvent::JoinPlay { play_id } => {
                let command = JoinPlay {
                    correlation_id,
                    connection_id,
                    play_id,
                };
                let outcome = handle_join_play(&command, &mut state.stage, clock);
                if let Some(left) = &outcome.left {
                    state.rooms.leave(left, connection_id);
                }
                state.rooms.join(&outcome.joined, connection_id);
                outcome.deliveries
            }
            ClientEvent::SetDirector { name, password } => {
                let command = ClaimDirector {
                    correlation_id,
                    connection_id,
                    name,
                    password,
                };
                handle_claim_director(&command, &self.password, &mut state.stage, clock)
            }
            ClientEvent::UnsetDirector => {
                let command = ReleaseDirector {
                    correlation_id,
                    connection_id,
                };
                handle_release_director(&command, &mut state.stage, clock)
            }
            ClientEvent::SetMarker { payload } => {
                let command = SetMarker {
                    correlation_id,
                    connection_id,
                    payload,
                };
                handle_set_marker(&command, &state.stage)
            }
        };

        state.deliver(deliveries);
    }

    /// Tears down a connection. Safe to call more than once.
    pub fn disconnect(&self, connection_id: ConnectionId) {
        let mut guard = self.lock();
        let state = &mut *guard;
        if state.outboxes.remove(&connection_id).is_none() {
            return;
        }

        let joined = state
            .stage
            .connections
            .has_joined(connection_id)
            .then(|| state.stage.connections.play_of(connection_id));
        let command = Disconnect {
            correlation_id: Uuid::new_v4(),
            connection_id,
        };
        let deliveries = handle_disconnect(&command, &mut state.stage, self.clock.as_ref());
        if let Some(play_id) = &joined {
            state.rooms.leave(play_id, connection_id);
        }
        state.deliver(deliveries);
        info!(
            connection_id = %connection_id,
            connections = state.outboxes.len(),
            "client disconnected"
        );
    }

    /// Counts for the health endpoint.
    #[must_use]
    pub fn summary(&self) -> GatewaySummary {
        let state = self.lock();
        GatewaySummary {
            connections: state.outboxes.len(),
            stage: stage_summary(&state.stage),
        }
    }
}

/// Snapshot of gateway load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GatewaySummary {
    /// Live transport sessions.
    pub connections: usize,
    /// Coordination state counts.
    pub stage: StageSummary,
}

impl GatewayState {
    fn deliver(&self, deliveries: Vec<Delivery>) {
        for delivery in deliveries {
            match &delivery.audience {
                Audience::Connection(target) => self.send(*target, &delivery.notification),
                Audience::Play { play_id, .. } => {
                    for member in self.rooms.members(play_id) {
                        if delivery.audience.includes(member, play_id) {
                            self.send(member, &delivery.notification);
                        }
                    }
                }
            }
        }
    }

    fn send(&self, target: ConnectionId, notification: &Notification) {
        let Some(outbox) = self.outboxes.get(&target) else {
            return;
        };
        if outbox.send(notification.clone()).is_err() {
            warn!(
                connection_id = %target,
                event = notification.event_name(),
                "outbox closed, notification dropped"
            );
        }
    }
}
