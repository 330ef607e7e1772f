//! Per-connection session state and the id → session directory.

use std::sync::Arc;

use dashmap::DashMap;
use morphlink_common::ConnectionId;
use serde_json::Value;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::error::DeliveryError;
use super::events::ServerMessage;

/// A serialized server → client text frame, shared across recipients.
pub type Frame = Arc<str>;

/// Encode `event` + `data` into a frame.
pub fn encode_frame(event: &str, data: &Value) -> Result<Frame, DeliveryError> {
    serde_json::to_string(&ServerMessage::new(event, data))
        .map(Frame::from)
        .map_err(|_| DeliveryError::Encode)
}

/// Outbound handle for a single WebSocket connection.
///
/// Cloning is cheap; every clone pushes into the same bounded queue, which
/// the connection's writer task drains in FIFO order.
#[derive(Clone)]
pub struct ConnectionSession {
    id: ConnectionId,
    tx: mpsc::Sender<Frame>,
}

impl ConnectionSession {
    /// Create a session with an outbound queue holding up to `capacity` frames.
    pub fn new(id: ConnectionId, capacity: usize) -> (Self, mpsc::Receiver<Frame>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self { id, tx }, rx)
    }

    pub fn id(&self) -> &ConnectionId {
        &self.id
    }

    /// Push one event to this connection.
    pub fn send(&self, event: &str, data: &Value) -> Result<(), DeliveryError> {
        let frame = encode_frame(event, data)?;
        self.send_frame(frame)
    }

    /// Push an already encoded frame. Never waits on a slow peer.
    pub fn send_frame(&self, frame: Frame) -> Result<(), DeliveryError> {
        self.tx.try_send(frame).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Full,
            TrySendError::Closed(_) => DeliveryError::Closed,
        })
    }

    /// `true` once the writer side has dropped its receiver.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

impl std::fmt::Debug for ConnectionSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionSession")
            .field("id", &self.id)
            .field("closed", &self.is_closed())
            .finish()
    }
}

/// Live sessions keyed by connection id.
#[derive(Default)]
pub struct SessionDirectory {
    sessions: DashMap<ConnectionId, ConnectionSession>,
}

impl SessionDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, session: ConnectionSession) {
        self.sessions.insert(session.id().clone(), session);
    }

    pub fn get(&self, id: &ConnectionId) -> Option<ConnectionSession> {
        self.sessions.get(id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, id: &ConnectionId) -> bool {
        self.sessions.contains_key(id)
    }

    pub fn remove(&self, id: &ConnectionId) -> Option<ConnectionSession> {
        self.sessions.remove(id).map(|(_, session)| session)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
