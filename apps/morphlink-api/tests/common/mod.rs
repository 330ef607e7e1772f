#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::time;
use tokio_tungstenite::tungstenite;

use morphlink_api::config::Config;
use morphlink_api::AppState;

pub type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

/// How long to wait for an expected frame before failing.
pub const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// Build a fresh AppState with default configuration.
pub fn test_state() -> AppState {
    AppState::new(Config::default())
}

/// Build the full application router wired to a fresh test state.
pub fn test_app() -> (Router, AppState) {
    let state = test_state();
    let app = morphlink_api::routes::router_with_docs().with_state(state.clone());
    (app, state)
}

/// Start an actual TCP server for WebSocket testing.
/// The server runs in the background for the rest of the test.
pub async fn start_ws_server() -> (SocketAddr, AppState) {
    start_ws_server_with(Config::default()).await
}

pub async fn start_ws_server_with(config: Config) -> (SocketAddr, AppState) {
    let state = AppState::new(config);
    let app = morphlink_api::routes::router().with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Open a WebSocket to the relay.
pub async fn connect(addr: SocketAddr) -> WsStream {
    let url = format!("ws://{addr}/ws");
    let (ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws
}

/// Send one `{ event, data }` envelope.
pub async fn send_event(ws: &mut WsStream, event: &str, data: Value) {
    let envelope = serde_json::json!({ "event": event, "data": data });
    send_text(ws, &envelope.to_string()).await;
}

pub async fn send_text(ws: &mut WsStream, text: &str) {
    ws.send(tungstenite::Message::Text(text.to_string().into()))
        .await
        .expect("ws send");
}

/// Receive the next JSON text frame, skipping control frames.
pub async fn recv_event(ws: &mut WsStream) -> Value {
    loop {
        let msg = time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream ended")
            .expect("ws read error");

        match msg {
            tungstenite::Message::Text(text) => {
                return serde_json::from_str(&text).expect("parse frame");
            }
            tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
            other => panic!("Expected text frame, got: {other:?}"),
        }
    }
}

/// Assert that no text frame arrives within `window`.
pub async fn expect_silence(ws: &mut WsStream, window: Duration) {
    if let Ok(Some(Ok(tungstenite::Message::Text(text)))) = time::timeout(window, ws.next()).await {
        panic!("Expected no frame, got: {text}");
    }
}

/// Join `room` and consume the `joined` acknowledgement.
pub async fn join_room(ws: &mut WsStream, room: &str) {
    send_event(ws, "join_room", serde_json::json!({ "room": room })).await;
    let ack = recv_event(ws).await;
    assert_eq!(ack["event"], "joined");
    assert_eq!(ack["data"]["room"], room);
}

/// Poll until `check` holds or the receive timeout elapses.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    let deadline = time::Instant::now() + RECV_TIMEOUT;
    while !check() {
        assert!(time::Instant::now() < deadline, "condition not reached in time");
        time::sleep(Duration::from_millis(10)).await;
    }
}

/// The face payload clients send in the common case.
pub fn sample_face_data(room: &str) -> Value {
    serde_json::json!({
        "roomId": room,
        "faceData": {
            "landmarks": { "points": [{ "x": 0, "y": 0 }] },
            "expressions": { "happy": 0.8, "sad": 0.1, "angry": 0.1 }
        }
    })
}
