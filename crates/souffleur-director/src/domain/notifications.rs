//! Outbound notifications and who receives them.
//!
//! Every notification serialises to the wire envelope
//! `{"event": <name>, "data": {...}}` that clients listen for.

use serde::{Deserialize, Serialize};
use souffleur_core::connection::ConnectionId;

use super::aggregates::PlayId;

/// Director name shown when a play has no director.
pub const NO_DIRECTOR: &str = "Niemand";

/// Failure message for a claim with a missing name or password.
pub const MISSING_CREDENTIALS_MESSAGE: &str = "Name und Passwort erforderlich";

/// Failure message for a claim with the wrong password.
pub const WRONG_PASSWORD_MESSAGE: &str = "Falsches Passwort";

/// Payload of `set_director`: a join snapshot, a claim confirmation, or a
/// claim failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorStatus {
    /// Whether the request (or snapshot) succeeded.
    pub success: bool,
    /// Current director name, or [`NO_DIRECTOR`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub director: Option<String>,
    /// Whether the recipient is the director.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_director: Option<bool>,
    /// Failure reason.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DirectorStatus {
    /// A successful status naming the director.
    #[must_use]
    pub fn accepted(director: impl Into<String>, is_director: bool) -> Self {
        Self {
            success: true,
            director: Some(director.into()),
            is_director: Some(is_director),
            message: None,
        }
    }

    /// A failed claim.
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            director: None,
            is_director: None,
            message: Some(message.into()),
        }
    }
}

/// Payload of `director_takeover`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorTakeover {
    /// Name of the displaced director.
    pub previous_director: String,
    /// Name of the new director.
    pub new_director: String,
    /// Whether the recipient is the new director.
    pub is_director: bool,
}

/// Payload of `unset_director`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DirectorUnset {
    /// Always [`NO_DIRECTOR`].
    pub director: String,
    /// Name of the released director.
    pub previous_director: String,
    /// Always `false`.
    pub is_director: bool,
}

impl DirectorUnset {
    /// Notice that `previous_director` no longer directs the play.
    #[must_use]
    pub fn new(previous_director: impl Into<String>) -> Self {
        Self {
            director: NO_DIRECTOR.to_owned(),
            previous_director: previous_director.into(),
            is_director: false,
        }
    }
}

/// A server-to-client event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum Notification {
    /// Director snapshot, claim confirmation or claim failure.
    SetDirector(DirectorStatus),
    /// A sitting director was displaced.
    DirectorTakeover(DirectorTakeover),
    /// The play no longer has a director.
    UnsetDirector(DirectorUnset),
    /// The director's marker, verbatim.
    MarkerUpdate(serde_json::Value),
}

impl Notification {
    /// Wire name of the event.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::SetDirector(_) => "set_director",
            Self::DirectorTakeover(_) => "director_takeover",
            Self::UnsetDirector(_) => "unset_director",
            Self::MarkerUpdate(_) => "marker_update",
        }
    }
}

/// Recipients of a notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Audience {
    /// A single connection.
    Connection(ConnectionId),
    /// Every member of a play's broadcast group except the listed ones.
    Play {
        /// The play whose members receive the notification.
        play_id: PlayId,
        /// Members to skip.
        except: Vec<ConnectionId>,
    },
}

impl Audience {
    /// Whether `connection_id` is addressed, given the members of the play.
    #[must_use]
    pub fn includes(&self, connection_id: ConnectionId, member_of: &PlayId) -> bool {
        match self {
            Self::Connection(target) => *target == connection_id,
            Self::Play { play_id, except } => {
                play_id == member_of && !except.contains(&connection_id)
            }
        }
    }
}

/// A notification paired with its audience.
#[derive(Debug, Clone, PartialEq)]
pub struct Delivery {
    /// Who receives it.
    pub audience: Audience,
    /// What they receive.
    pub notification: Notification,
}

impl Delivery {
    /// Delivery to one connection.
    #[must_use]
    pub fn to_connection(connection_id: ConnectionId, notification: Notification) -> Self {
        Self {
            audience: Audience::Connection(connection_id),
            notification,
        }
    }

    /// Delivery to a play's members, skipping `except`.
    #[must_use]
    pub fn to_play(play_id: PlayId, except: Vec<ConnectionId>, notification: Notification) -> Self {
        Self {
            audience: Audience::Play { play_id, except },
            notification,
        }
    }
}
