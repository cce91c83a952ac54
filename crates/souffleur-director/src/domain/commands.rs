//! Commands for the director context.

use souffleur_core::command::Command;
use souffleur_core::connection::ConnectionId;
use uuid::Uuid;

use super::aggregates::PlayId;

/// Command to move a connection into a play.
#[derive(Debug, Clone)]
pub struct JoinPlay {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The joining connection.
    pub connection_id: ConnectionId,
    /// The play to join.
    pub play_id: PlayId,
}

impl Command for JoinPlay {
    fn command_type(&self) -> &'static str {
        "director.join_play"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to claim (or take over) director status of the caller's play.
#[derive(Debug, Clone)]
pub struct ClaimDirector {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The claiming connection.
    pub connection_id: ConnectionId,
    /// Display name, as sent by the client.
    pub name: Option<String>,
    /// Shared director password, as sent by the client.
    pub password: Option<String>,
}

impl Command for ClaimDirector {
    fn command_type(&self) -> &'static str {
        "director.claim"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to step down as director of the caller's play.
#[derive(Debug, Clone)]
pub struct ReleaseDirector {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The releasing connection.
    pub connection_id: ConnectionId,
}

impl Command for ReleaseDirector {
    fn command_type(&self) -> &'static str {
        "director.release"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command to relay a marker to the caller's play.
#[derive(Debug, Clone)]
pub struct SetMarker {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The sending connection.
    pub connection_id: ConnectionId,
    /// Opaque marker payload, forwarded verbatim.
    pub payload: serde_json::Value,
}

impl Command for SetMarker {
    fn command_type(&self) -> &'static str {
        "director.set_marker"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}

/// Command issued when a connection's transport goes away.
#[derive(Debug, Clone)]
pub struct Disconnect {
    /// The correlation ID for tracing.
    pub correlation_id: Uuid,
    /// The departed connection.
    pub connection_id: ConnectionId,
}

impl Command for Disconnect {
    fn command_type(&self) -> &'static str {
        "director.disconnect"
    }

    fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }
}
