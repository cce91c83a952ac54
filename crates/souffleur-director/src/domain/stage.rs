//! Coordination state owned by the session gateway.

use super::directory::PlayDirectory;
use super::registry::ConnectionRegistry;

/// The process-wide maps the command handlers operate on. The gateway owns
/// one `Stage` and passes it in explicitly; nothing here is global.
#[derive(Debug, Default)]
pub struct Stage {
    /// Connection to play membership.
    pub connections: ConnectionRegistry,
    /// Director status per play.
    pub directory: PlayDirectory,
}

impl Stage {
    /// Creates empty coordination state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
