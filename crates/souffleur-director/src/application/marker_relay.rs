//! Marker relay: forwards the director's markers to the rest of the play.

use tracing::{debug, instrument};

use crate::domain::commands::SetMarker;
use crate::domain::notifications::{Delivery, Notification};
use crate::domain::stage::Stage;

/// Handles the `SetMarker` command. Only the sitting director of the
/// caller's play may set markers; anyone else is ignored without a reply.
/// The payload is passed through untouched to every other member.
#[instrument(
    skip_all,
    fields(correlation_id = %command.correlation_id, connection_id = %command.connection_id)
)]
pub fn handle_set_marker(command: &SetMarker, stage: &Stage) -> Vec<Delivery> {
    let play_id = stage.connections.play_of(command.connection_id);
    if !stage.directory.is_director(&play_id, command.connection_id) {
        debug!(play_id = %play_id, "marker from non-director ignored");
        return Vec::new();
    }

    debug!(play_id = %play_id, "relaying marker");
    vec![Delivery::to_play(
        play_id,
        vec![command.connection_id],
        Notification::MarkerUpdate(command.payload.clone()),
    )]
}
