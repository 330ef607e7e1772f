//! Gateway error taxonomy.

use thiserror::Error;

use super::events::{ERROR_INVALID_JSON, ERROR_MALFORMED_PAYLOAD, ERROR_UNKNOWN_EVENT};

/// An inbound frame that could not be turned into an `InboundMessage`.
///
/// Rejects the single frame only; the connection stays open.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("{0}")]
    MalformedPayload(&'static str),
    #[error("invalid json")]
    InvalidJson,
    #[error("unknown event: {0}")]
    UnknownEvent(String),
}

impl GatewayError {
    /// Numeric code reported to the client in the `error` event.
    pub fn code(&self) -> u16 {
        match self {
            Self::MalformedPayload(_) => ERROR_MALFORMED_PAYLOAD,
            Self::InvalidJson => ERROR_INVALID_JSON,
            Self::UnknownEvent(_) => ERROR_UNKNOWN_EVENT,
        }
    }
}

/// Failure to push one frame to one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeliveryError {
    /// The connection's writer has gone away.
    #[error("connection closed")]
    Closed,
    /// The connection's outbound queue is at capacity.
    #[error("send queue full")]
    Full,
    /// The outbound message could not be serialized.
    #[error("failed to encode message")]
    Encode,
}
