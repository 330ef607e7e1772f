//! Inbound payload shapes and structural validation.
//!
//! Only the presence and type of routing fields is checked. The face payload
//! itself is opaque: it must be a JSON object, nothing more.

use serde_json::Value;

use super::error::GatewayError;
use super::events::{ClientMessage, EventName};

const MISSING_ROOM: &str = "missing room";
const MISSING_ROOM_ID_OR_FACE_DATA: &str = "missing roomId or faceData";

/// Keys that may carry the face payload in a `face_data` message.
const FACE_PAYLOAD_KEYS: [&str; 2] = ["faceData", "mask"];

/// `join_room { room }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinRequest {
    pub room: String,
}

/// `leave_room { room }`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeaveRequest {
    pub room: String,
}

/// `face_data { roomId, faceData }`.
#[derive(Debug, Clone, PartialEq)]
pub struct DataMessage {
    pub room_id: String,
    /// The complete inbound object, rebroadcast unchanged.
    pub payload: Value,
}

/// Every message kind a client may send.
#[derive(Debug, Clone, PartialEq)]
pub enum InboundMessage {
    Join(JoinRequest),
    Leave(LeaveRequest),
    Data(DataMessage),
}

pub fn parse_join(raw: &Value) -> Result<JoinRequest, GatewayError> {
    let room = non_empty_str(raw, "room").ok_or(GatewayError::MalformedPayload(MISSING_ROOM))?;
    Ok(JoinRequest {
        room: room.to_string(),
    })
}

pub fn parse_leave(raw: &Value) -> Result<LeaveRequest, GatewayError> {
    let room = non_empty_str(raw, "room").ok_or(GatewayError::MalformedPayload(MISSING_ROOM))?;
    Ok(LeaveRequest {
        room: room.to_string(),
    })
}

pub fn parse_data(raw: &Value) -> Result<DataMessage, GatewayError> {
    let malformed = GatewayError::MalformedPayload(MISSING_ROOM_ID_OR_FACE_DATA);

    let room_id = non_empty_str(raw, "roomId").ok_or(malformed.clone())?;
    let has_face = FACE_PAYLOAD_KEYS
        .iter()
        .any(|key| raw.get(key).is_some_and(Value::is_object));
    if !has_face {
        return Err(malformed);
    }

    Ok(DataMessage {
        room_id: room_id.to_string(),
        payload: raw.clone(),
    })
}

/// Map a decoded envelope onto the closed set of inbound messages.
pub fn decode(msg: ClientMessage) -> Result<InboundMessage, GatewayError> {
    match msg.event.as_str() {
        EventName::JOIN_ROOM => parse_join(&msg.data).map(InboundMessage::Join),
        EventName::LEAVE_ROOM => parse_leave(&msg.data).map(InboundMessage::Leave),
        EventName::FACE_DATA => parse_data(&msg.data).map(InboundMessage::Data),
        _ => Err(GatewayError::UnknownEvent(msg.event)),
    }
}

/// Parse a raw text frame all the way to an `InboundMessage`.
pub fn decode_text(text: &str) -> Result<InboundMessage, GatewayError> {
    let msg: ClientMessage = serde_json::from_str(text).map_err(|_| GatewayError::InvalidJson)?;
    decode(msg)
}

fn non_empty_str<'a>(raw: &'a Value, key: &str) -> Option<&'a str> {
    raw.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parse_join_requires_non_empty_room() {
        assert_eq!(
            parse_join(&json!({ "room": "r1" })).unwrap(),
            JoinRequest { room: "r1".into() }
        );

        for bad in [json!({}), json!({ "room": "" }), json!({ "room": 7 }), json!(null), json!("r1")] {
            assert_eq!(
                parse_join(&bad),
                Err(GatewayError::MalformedPayload("missing room"))
            );
        }
    }

    #[test]
    fn parse_data_keeps_whole_payload() {
        let raw = json!({
            "roomId": "r1",
            "faceData": {
                "landmarks": { "points": [{ "x": 0, "y": 0 }] },
                "expressions": { "happy": 0.8, "sad": 0.1, "angry": 0.1 }
            }
        });
        let msg = parse_data(&raw).unwrap();
        assert_eq!(msg.room_id, "r1");
        assert_eq!(msg.payload, raw);
    }

    #[test]
    fn parse_data_accepts_mask_variant() {
        let raw = json!({
            "roomId": "r1",
            "mask": {
                "landmarks": { "eyes": [], "nose": { "x": 1, "y": 2 }, "mouth": [], "contour": [] },
                "expressions": { "smile": 0.3, "eyesClosed": 0.0 },
                "timestamp": 1
            }
        });
        assert!(parse_data(&raw).is_ok());
    }

    #[test]
    fn parse_data_rejects_missing_fields() {
        let expected = Err(GatewayError::MalformedPayload("missing roomId or faceData"));
        assert_eq!(parse_data(&json!({ "faceData": {} })), expected);
        assert_eq!(parse_data(&json!({ "roomId": "r1" })), expected);
        assert_eq!(parse_data(&json!({ "roomId": "", "faceData": {} })), expected);
        assert_eq!(parse_data(&json!({ "roomId": "r1", "faceData": "x" })), expected);
    }

    #[test]
    fn decode_routes_by_event_name() {
        let join = decode_text(r#"{"event":"join_room","data":{"room":"a"}}"#).unwrap();
        assert!(matches!(join, InboundMessage::Join(JoinRequest { ref room }) if room == "a"));

        let leave = decode_text(r#"{"event":"leave_room","data":{"room":"a"}}"#).unwrap();
        assert!(matches!(leave, InboundMessage::Leave(_)));

        let data = decode_text(r#"{"event":"face_data","data":{"roomId":"a","faceData":{}}}"#).unwrap();
        assert!(matches!(data, InboundMessage::Data(_)));
    }

    #[test]
    fn decode_reports_envelope_errors() {
        assert_eq!(decode_text("not json"), Err(GatewayError::InvalidJson));
        assert_eq!(decode_text(r#"{"data":{}}"#), Err(GatewayError::InvalidJson));
        assert_eq!(
            decode_text(r#"{"event":"wave","data":{}}"#),
            Err(GatewayError::UnknownEvent("wave".into()))
        );
        assert_eq!(
            decode_text(r#"{"event":"join_room","data":{}}"#),
            Err(GatewayError::MalformedPayload("missing room"))
        );
    }
}
