//! WebSocket endpoint: one actor per connection.
//!
//! The socket is split in two. A writer task owns the sink and forwards both
//! gateway notifications and transport control frames. The reader loop owns
//! the stream, parses client events and hands them to the gateway. A
//! heartbeat task pings the client and closes the socket when a pong does not
//! come back in time, so a vanished director is released promptly.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::extract::State;
use axum::extract::ws::{CloseFrame, Message, WebSocket, WebSocketUpgrade, close_code};
use axum::response::Response;
use axum::routing::get;
use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use souffleur_core::connection::ConnectionId;
use souffleur_director::domain::notifications::Notification;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::{interval, timeout};

use crate::gateway::SessionGateway;
use crate::gateway::protocol::ClientEvent;
use crate::state::AppState;

/// Interval between server pings.
const PING_INTERVAL: Duration = Duration::from_secs(30);

/// How long a ping may go unanswered before the socket is closed.
const PONG_TIMEOUT: Duration = Duration::from_secs(10);

/// How long the writer may take to flush after the reader stops.
const FLUSH_GRACE: Duration = Duration::from_secs(1);

/// Returns the WebSocket router.
pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

/// GET /ws
async fn ws_upgrade(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_connection(socket, state.gateway))
}

/// Drives one client session from upgrade to teardown.
pub async fn run_connection(socket: WebSocket, gateway: Arc<SessionGateway>) {
    let (ws_sender, mut ws_receiver) = socket.split();
    let (outbox_tx, outbox_rx) = mpsc::unbounded_channel::<Notification>();
    let (control_tx, control_rx) = mpsc::unbounded_channel::<Message>();

    let connection_id = gateway.connect(outbox_tx);
    let mut writer = tokio::spawn(writer_task(ws_sender, outbox_rx, control_rx));

    let (pong_tx, pong_rx) = mpsc::unbounded_channel::<()>();
    let mut heartbeat = tokio::spawn(heartbeat_task(control_tx.clone(), pong_rx, connection_id));

    loop {
        let frame = tokio::select! {
            frame = ws_receiver.next() => frame,
            _ = &mut heartbeat => break,
        };
        match frame {
            Some(Ok(Message::Text(text))) => match ClientEvent::parse(text.as_str()) {
                Ok(event) => gateway.dispatch(connection_id, event),
                Err(err) => {
                    tracing::warn!(
                        connection_id = %connection_id,
                        error = %err,
                        "ignoring client frame"
                    );
                }
            },
            Some(Ok(Message::Binary(_))) => {
                tracing::debug!(connection_id = %connection_id, "ignoring binary frame");
            }
            Some(Ok(Message::Pong(_))) => {
                let _ = pong_tx.send(());
            }
            Some(Ok(Message::Ping(data))) => {
                let _ = control_tx.send(Message::Pong(data));
            }
            Some(Ok(Message::Close(frame))) => {
                tracing::debug!(
                    connection_id = %connection_id,
                    reason = ?frame,
                    "client initiated close"
                );
                break;
            }
            Some(Err(err)) => {
                tracing::warn!(
                    connection_id = %connection_id,
                    error = %err,
                    "websocket receive error"
                );
                break;
            }
            None => break,
        }
    }

    heartbeat.abort();
    // Drops the outbox sender held by the gateway.
    gateway.disconnect(connection_id);
    drop(control_tx);
    if timeout(FLUSH_GRACE, &mut writer).await.is_err() {
        writer.abort();
    }
}

/// Forwards notifications and control frames to the socket until both
/// channels close or the socket fails.
async fn writer_task(
    mut ws_sender: SplitSink<WebSocket, Message>,
    mut notifications: UnboundedReceiver<Notification>,
    mut control: UnboundedReceiver<Message>,
) {
    loop {
        let message = tokio::select! {
            Some(notification) = notifications.recv() => {
                match serde_json::to_string(&notification) {
                    Ok(json) => Message::Text(json.into()),
                    Err(err) => {
                        tracing::error!(
                            event = notification.event_name(),
                            error = %err,
                            "failed to encode notification"
                        );
                        continue;
                    }
                }
            }
            Some(message) = control.recv() => message,
            else => break,
        };
        let closing = matches!(message, Message::Close(_));
        if ws_sender.send(message).await.is_err() || closing {
            break;
        }
    }
}

/// Pings every [`PING_INTERVAL`]; returns after sending a close frame when a
/// pong is overdue.
async fn heartbeat_task(
    control: UnboundedSender<Message>,
    mut pongs: UnboundedReceiver<()>,
    connection_id: ConnectionId,
) {
    let mut ticker = interval(PING_INTERVAL);
    // The first tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        // Pongs that arrived unprompted do not count for this round.
        while pongs.try_recv().is_ok() {}

        if control.send(Message::Ping(vec![1, 2, 3, 4].into())).is_err() {
            return;
        }
        match timeout(PONG_TIMEOUT, pongs.recv()).await {
            Ok(Some(())) => {}
            _ => {
                tracing::warn!(connection_id = %connection_id, "pong timeout, closing connection");
                let _ = control.send(Message::Close(Some(CloseFrame {
                    code: close_code::AWAY,
                    reason: "pong timeout".into(),
                })));
                return;
            }
        }
    }
}
