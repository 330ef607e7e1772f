//! WebSocket upgrade handler and per-connection event loop.

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::sync::mpsc;

use crate::AppState;

use super::dispatcher::BroadcastDispatcher;
use super::error::DeliveryError;
use super::schema;
use super::session::{ConnectionSession, Frame};

pub fn router() -> Router<AppState> {
    Router::new().route("/ws", get(ws_upgrade))
}

async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_connection(socket, state))
}

async fn handle_connection(socket: WebSocket, state: AppState) {
    let (ws_tx, ws_rx) = socket.split();
    let dispatcher = state.dispatcher.clone();

    let (session, outbound_rx) = dispatcher.connect();

    let mut send_task = tokio::spawn(write_frames(ws_tx, outbound_rx));
    let mut recv_task = tokio::spawn({
        let dispatcher = dispatcher.clone();
        let session = session.clone();
        async move { read_frames(ws_rx, &session, &dispatcher).await }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            let _ = recv_task.await;
        }
        _ = (&mut recv_task) => {
            send_task.abort();
            let _ = send_task.await;
        }
    };

    // Both tasks have stopped, so no route call can run after this.
    dispatcher.close(session.id());
}

/// Drain the session's outbound queue into the socket, in order.
async fn write_frames(mut ws_tx: SplitSink<WebSocket, Message>, mut outbound_rx: mpsc::Receiver<Frame>) {
    while let Some(frame) = outbound_rx.recv().await {
        if ws_tx.send(Message::Text((&*frame).into())).await.is_err() {
            break;
        }
    }
    let _ = ws_tx.close().await;
}

/// Handle inbound frames one at a time so a client's own messages keep their order.
async fn read_frames(
    mut ws_rx: SplitStream<WebSocket>,
    session: &ConnectionSession,
    dispatcher: &BroadcastDispatcher,
) {
    while let Some(msg) = ws_rx.next().await {
        let text = match msg {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) => break,
            Ok(_) => continue,
            Err(e) => {
                tracing::debug!(?e, connection_id = %session.id(), "ws read error");
                break;
            }
        };

        let outcome = match schema::decode_text(text.as_str()) {
            Ok(message) => dispatcher.route(session, message).map(|dispatch| {
                tracing::debug!(connection_id = %session.id(), ?dispatch, "routed");
            }),
            Err(e) => dispatcher.reject(session, &e),
        };

        match outcome {
            Ok(()) => {}
            Err(DeliveryError::Closed) => break,
            Err(e) => {
                tracing::warn!(connection_id = %session.id(), error = %e, "reply to sender dropped");
            }
        }
    }
}
