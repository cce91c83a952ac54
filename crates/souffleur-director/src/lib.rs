//! Souffleur: director election and marker relay context.
//!
//! Responsible for per-play director status (claim, takeover, release),
//! the connection-to-play registry, and relaying the director's markers
//! to everyone else watching the same play.
//!
//! Nothing here touches a socket: command handlers return the
//! [`domain::notifications::Delivery`] list the session gateway fans out.

pub mod application;
pub mod domain;
