//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use futures_util::{SinkExt, StreamExt};
use http_body_util::BodyExt;
use serde_json::Value;
use souffleur_api::gateway::SessionGateway;
use souffleur_api::routes;
use souffleur_api::state::AppState;
use souffleur_core::clock::Clock;
use souffleur_director::domain::credential::DirectorPassword;
use souffleur_test_support::FixedClock;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tower::ServiceExt;

/// Director password accepted by every test server.
pub const PASSWORD: &str = "secret";

/// Client side of a test WebSocket.
pub type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Fixed timestamp used across all integration tests.
fn fixed_clock() -> Arc<dyn Clock> {
    Arc::new(FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    ))
}

fn test_gateway() -> Arc<SessionGateway> {
    Arc::new(SessionGateway::new(
        DirectorPassword::new(PASSWORD),
        fixed_clock(),
    ))
}

/// Build the full app router with a fixed clock. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app() -> Router {
    routes::app(AppState::new(test_gateway()))
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

/// Serve a fresh app on a random local port. The gateway is returned so
/// tests can inspect its counts.
pub async fn spawn_server() -> (SocketAddr, Arc<SessionGateway>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let gateway = test_gateway();
    let app = routes::app(AppState::new(gateway.clone()));

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, gateway)
}

/// Open a WebSocket to `/ws`.
pub async fn connect(addr: SocketAddr) -> Client {
    let (client, _) = connect_async(format!("ws://{addr}/ws")).await.unwrap();
    client
}

/// Send `{"event": event, "data": data}`.
pub async fn send(client: &mut Client, event: &str, data: Value) {
    let frame = serde_json::json!({ "event": event, "data": data });
    client
        .send(Message::text(frame.to_string()))
        .await
        .unwrap();
}

/// Wait for the next text frame and parse it.
pub async fn recv(client: &mut Client) -> Value {
    loop {
        let message = tokio::time::timeout(Duration::from_secs(2), client.next())
            .await
            .expect("timed out waiting for a frame")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = message {
            return serde_json::from_str(text.as_str()).unwrap();
        }
    }
}

/// Assert that no text frame arrives within a short window.
pub async fn assert_silent(client: &mut Client) {
    let result = tokio::time::timeout(Duration::from_millis(200), client.next()).await;
    if let Ok(Some(Ok(Message::Text(text)))) = result {
        panic!("unexpected frame: {}", text.as_str());
    }
}
