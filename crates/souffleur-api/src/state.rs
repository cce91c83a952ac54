//! Shared application state.

use std::sync::Arc;

use crate::gateway::SessionGateway;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// The one gateway every connection talks to.
    pub gateway: Arc<SessionGateway>,
}

impl AppState {
    /// Create new application state.
    #[must_use]
    pub fn new(gateway: Arc<SessionGateway>) -> Self {
        Self { gateway }
    }
}
