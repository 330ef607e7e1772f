//! Routes inbound messages and fans `face_data` out to room members.

use std::sync::Arc;

use morphlink_common::ConnectionId;
use tokio::sync::mpsc;

use super::error::{DeliveryError, GatewayError};
use super::events::{error_body, room_ack, EventName};
use super::registry::RoomRegistry;
use super::schema::{DataMessage, InboundMessage, JoinRequest, LeaveRequest};
use super::session::{encode_frame, ConnectionSession, Frame, SessionDirectory};

/// Whether a `face_data` broadcast also goes back to its sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SenderPolicy {
    /// Every member of the room, the sender included.
    #[default]
    Include,
    /// Every member except the sender.
    Exclude,
}

/// Outcome of one `face_data` fan-out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Frames queued for a recipient.
    pub delivered: usize,
    /// Recipients whose send failed (queue full or writer gone).
    pub failed: usize,
    /// Members in the snapshot whose session had already been closed.
    pub skipped: usize,
}

/// Result of routing one inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Joined { room: String },
    Left { room: String },
    Broadcast(DeliveryReport),
}

/// The room-aware broadcast core shared by every gateway connection.
pub struct BroadcastDispatcher {
    registry: Arc<RoomRegistry>,
    sessions: SessionDirectory,
    policy: SenderPolicy,
    queue_capacity: usize,
}

impl BroadcastDispatcher {
    pub fn new(registry: Arc<RoomRegistry>, policy: SenderPolicy, queue_capacity: usize) -> Self {
        Self {
            registry,
            sessions: SessionDirectory::new(),
            policy,
            queue_capacity,
        }
    }

    pub fn registry(&self) -> &Arc<RoomRegistry> {
        &self.registry
    }

    pub fn policy(&self) -> SenderPolicy {
        self.policy
    }

    /// Number of sessions currently connected.
    pub fn connection_count(&self) -> usize {
        self.sessions.len()
    }

    /// Register a new connection and hand back its session plus the queue
    /// its writer must drain.
    pub fn connect(&self) -> (ConnectionSession, mpsc::Receiver<Frame>) {
        let (session, rx) = ConnectionSession::new(ConnectionId::new(), self.queue_capacity);
        self.sessions.insert(session.clone());
        tracing::info!(connection_id = %session.id(), "connection opened");
        (session, rx)
    }

    /// Tear down a connection: forget the session, then leave every room.
    ///
    /// The session goes first so a join racing this call sees it missing and
    /// backs itself out (see `handle_join`).
    pub fn close(&self, id: &ConnectionId) {
        self.sessions.remove(id);
        let rooms = self.registry.leave_all(id);
        tracing::info!(connection_id = %id, rooms = ?rooms, "connection closed");
    }

    /// Route one inbound message from `session`.
    ///
    /// An `Err` means the sender itself could not be reached; failures to
    /// reach other members are folded into the `DeliveryReport`.
    pub fn route(
        &self,
        session: &ConnectionSession,
        message: InboundMessage,
    ) -> Result<Dispatch, DeliveryError> {
        match message {
            InboundMessage::Join(request) => self.handle_join(session, request),
            InboundMessage::Leave(request) => self.handle_leave(session, request),
            InboundMessage::Data(message) => Ok(Dispatch::Broadcast(self.handle_data(session, message))),
        }
    }

    /// Join the room and acknowledge to the joining connection only.
    pub fn handle_join(
        &self,
        session: &ConnectionSession,
        request: JoinRequest,
    ) -> Result<Dispatch, DeliveryError> {
        let added = self.registry.join(session.id(), &request.room);

        // `close` removes the session before `leave_all`, so a missing session
        // here means the membership above may have landed after cleanup.
        if !self.sessions.contains(session.id()) {
            self.registry.leave(session.id(), &request.room);
            tracing::debug!(connection_id = %session.id(), room = %request.room, "join after close dropped");
            return Err(DeliveryError::Closed);
        }

        tracing::info!(
            connection_id = %session.id(),
            room = %request.room,
            already_member = !added,
            "joined room"
        );

        session.send(EventName::JOINED, &room_ack(&request.room))?;
        Ok(Dispatch::Joined { room: request.room })
    }

    pub fn handle_leave(
        &self,
        session: &ConnectionSession,
        request: LeaveRequest,
    ) -> Result<Dispatch, DeliveryError> {
        let was_member = self.registry.leave(session.id(), &request.room);
        tracing::info!(
            connection_id = %session.id(),
            room = %request.room,
            was_member,
            "left room"
        );

        session.send(EventName::LEFT, &room_ack(&request.room))?;
        Ok(Dispatch::Left { room: request.room })
    }

    /// Fan `message` out to the current members of its room.
    pub fn handle_data(&self, session: &ConnectionSession, message: DataMessage) -> DeliveryReport {
        let mut report = DeliveryReport::default();

        let members = self.registry.members_of(&message.room_id);
        if members.is_empty() {
            tracing::debug!(room = %message.room_id, "face_data for empty room");
            return report;
        }

        let frame = match encode_frame(EventName::FACE_DATA, &message.payload) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::warn!(connection_id = %session.id(), error = %e, "dropping face_data");
                return report;
            }
        };

        for member in &members {
            if self.policy == SenderPolicy::Exclude && member == session.id() {
                continue;
            }

            let Some(target) = self.sessions.get(member) else {
                report.skipped += 1;
                continue;
            };

            match target.send_frame(frame.clone()) {
                Ok(()) => report.delivered += 1,
                Err(e) => {
                    report.failed += 1;
                    tracing::warn!(
                        connection_id = %member,
                        room = %message.room_id,
                        error = %e,
                        "face_data delivery failed"
                    );
                }
            }
        }

        report
    }

    /// Tell `session` its last frame was rejected.
    pub fn reject(&self, session: &ConnectionSession, error: &GatewayError) -> Result<(), DeliveryError> {
        tracing::warn!(connection_id = %session.id(), error = %error, "rejected inbound frame");
        session.send(EventName::ERROR, &error_body(&error.to_string(), error.code()))
    }
}
