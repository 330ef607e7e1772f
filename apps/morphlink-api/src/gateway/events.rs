//! Wire envelope, event names, and server-side message builders.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ---------------------------------------------------------------------------
// Error codes carried in `error` events
// ---------------------------------------------------------------------------

pub const ERROR_MALFORMED_PAYLOAD: u16 = 4000;
pub const ERROR_INVALID_JSON: u16 = 4001;
pub const ERROR_UNKNOWN_EVENT: u16 = 4002;

// ---------------------------------------------------------------------------
// Event names
// ---------------------------------------------------------------------------

/// Event names used on the socket, in both directions.
pub struct EventName;

impl EventName {
    pub const JOIN_ROOM: &'static str = "join_room";
    pub const LEAVE_ROOM: &'static str = "leave_room";
    pub const FACE_DATA: &'static str = "face_data";
    pub const JOINED: &'static str = "joined";
    pub const LEFT: &'static str = "left";
    pub const ERROR: &'static str = "error";
}

// ---------------------------------------------------------------------------
// Server → Client message
// ---------------------------------------------------------------------------

/// A message sent from the server to the client over WebSocket.
#[derive(Debug, Clone, Serialize)]
pub struct ServerMessage<'a> {
    pub event: &'a str,
    pub data: &'a Value,
}

impl<'a> ServerMessage<'a> {
    pub fn new(event: &'a str, data: &'a Value) -> Self {
        Self { event, data }
    }
}

/// Payload of `joined` and `left` acknowledgements.
pub fn room_ack(room: &str) -> Value {
    serde_json::json!({ "room": room })
}

/// Payload of an `error` event.
pub fn error_body(message: &str, code: u16) -> Value {
    serde_json::json!({ "error": message, "code": code })
}

// ---------------------------------------------------------------------------
// Client → Server message
// ---------------------------------------------------------------------------

/// A message received from the client over WebSocket.
#[derive(Debug, Deserialize)]
pub struct ClientMessage {
    pub event: String,
    #[serde(default)]
    pub data: Value,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_message_serializes_event_and_data() {
        let data = room_ack("r1");
        let json = serde_json::to_value(ServerMessage::new(EventName::JOINED, &data)).unwrap();
        assert_eq!(json, serde_json::json!({ "event": "joined", "data": { "room": "r1" } }));
    }

    #[test]
    fn client_message_data_defaults_to_null() {
        let msg: ClientMessage = serde_json::from_str(r#"{"event":"join_room"}"#).unwrap();
        assert_eq!(msg.event, EventName::JOIN_ROOM);
        assert!(msg.data.is_null());
    }
}
