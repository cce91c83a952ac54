//! Inbound wire protocol.
//!
//! Clients send JSON text frames of the form
//! `{"event": "<name>", "data": {...}}`. `data` may be omitted.

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use souffleur_director::domain::aggregates::PlayId;
use thiserror::Error;

/// A parsed client-to-server event.
#[derive(Debug, Clone, PartialEq)]
pub enum ClientEvent {
    /// `join_play`: move into a play (sentinel play if none named).
    JoinPlay {
        /// Play to join.
        play_id: PlayId,
    },
    /// `set_director`: claim director status.
    SetDirector {
        /// Display name.
        name: Option<String>,
        /// Shared director password.
        password: Option<String>,
    },
    /// `unset_director`: step down as director.
    UnsetDirector,
    /// `set_marker`: broadcast a marker.
    SetMarker {
        /// Opaque marker payload.
        payload: Value,
    },
}

/// Why an inbound frame was not understood.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// The frame is not a valid envelope or its payload has the wrong shape.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The envelope names an event this server does not handle.
    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

#[derive(Debug, Deserialize)]
struct Envelope {
    event: String,
    #[serde(default)]
    data: Value,
}

#[derive(Debug, Default, Deserialize)]
struct JoinPlayData {
    #[serde(rename = "playId", alias = "play_id", default)]
    play_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SetDirectorData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    password: Option<String>,
}

impl ClientEvent {
    /// Parses one text frame.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError::Malformed` for invalid JSON or payloads of the
    /// wrong shape, and `ProtocolError::UnknownEvent` for unrecognised
    /// event names.
    pub fn parse(text: &str) -> Result<Self, ProtocolError> {
        let envelope: Envelope = serde_json::from_str(text)?;
        match envelope.event.as_str() {
            "join_play" => {
                let data: JoinPlayData = payload(envelope.data)?;
                Ok(Self::JoinPlay {
                    play_id: data.play_id.map(PlayId::from).unwrap_or_default(),
                })
            }
            "set_director" => {
                let data: SetDirectorData = payload(envelope.data)?;
                Ok(Self::SetDirector {
                    name: data.name,
                    password: data.password,
                })
            }
            "unset_director" => Ok(Self::UnsetDirector),
            "set_marker" => Ok(Self::SetMarker {
                payload: envelope.data,
            }),
            _ => Err(ProtocolError::UnknownEvent(envelope.event)),
        }
    }

    /// Wire name of the event.
    #[must_use]
    pub fn event_name(&self) -> &'static str {
        match self {
            Self::JoinPlay { .. } => "join_play",
            Self::SetDirector { .. } => "set_director",
            Self::UnsetDirector => "unset_director",
            Self::SetMarker { .. } => "set_marker",
        }
    }
}

/// Deserialises an event payload, treating an absent one as empty.
fn payload<T: DeserializeOwned + Default>(data: Value) -> Result<T, serde_json::Error> {
    if data.is_null() {
        Ok(T::default())
    } else {
        serde_json::from_value(data)
    }
}
