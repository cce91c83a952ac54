//! Souffleur API: WebSocket coordination server.
//!
//! Hosts the session gateway that serialises every inbound protocol event
//! against the director context, plus the HTTP surface around it.

pub mod config;
pub mod error;
pub mod gateway;
pub mod routes;
pub mod state;
