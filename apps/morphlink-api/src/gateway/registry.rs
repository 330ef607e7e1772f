//! Room membership registry.
//!
//! Two `DashMap` indexes are kept: room → members and connection → rooms.
//! A room's member set is only ever mutated while its shard lock is held, so
//! `members_of` always returns a whole set, never a half-applied update.

use std::collections::HashSet;

use dashmap::DashMap;
use morphlink_common::ConnectionId;
use serde::Serialize;
use utoipa::ToSchema;

/// Room id and its current member count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct RoomSummary {
    pub room: String,
    pub members: usize,
}

/// Thread-safe room → connections mapping.
#[derive(Default)]
pub struct RoomRegistry {
    rooms: DashMap<String, HashSet<ConnectionId>>,
    memberships: DashMap<ConnectionId, HashSet<String>>,
}

impl RoomRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `conn` to `room`. Joining a second room keeps the first.
    ///
    /// Returns `true` if the connection was not already a member.
    pub fn join(&self, conn: &ConnectionId, room: &str) -> bool {
        let added = self
            .rooms
            .entry(room.to_string())
            .or_default()
            .insert(conn.clone());

        self.memberships
            .entry(conn.clone())
            .or_default()
            .insert(room.to_string());

        added
    }

    /// Remove `conn` from `room`. Unknown rooms and non-members are a no-op.
    ///
    /// Returns `true` if the connection was a member.
    pub fn leave(&self, conn: &ConnectionId, room: &str) -> bool {
        let removed = self.remove_member(room, conn);

        if let Some(mut rooms) = self.memberships.get_mut(conn) {
            rooms.remove(room);
        }
        self.memberships.remove_if(conn, |_, rooms| rooms.is_empty());

        removed
    }

    /// Remove `conn` from every room it belongs to. Returns the rooms it left.
    pub fn leave_all(&self, conn: &ConnectionId) -> Vec<String> {
        let Some((_, rooms)) = self.memberships.remove(conn) else {
            return Vec::new();
        };

        let mut left: Vec<String> = rooms
            .into_iter()
            .filter(|room| self.remove_member(room, conn))
            .collect();
        left.sort();
        left
    }

    /// Snapshot of the room's current members. Empty for unknown rooms.
    pub fn members_of(&self, room: &str) -> HashSet<ConnectionId> {
        self.rooms
            .get(room)
            .map(|members| members.value().clone())
            .unwrap_or_default()
    }

    /// Rooms `conn` is currently joined to, sorted.
    pub fn rooms_of(&self, conn: &ConnectionId) -> Vec<String> {
        let mut rooms: Vec<String> = self
            .memberships
            .get(conn)
            .map(|rooms| rooms.value().iter().cloned().collect())
            .unwrap_or_default();
        rooms.sort();
        rooms
    }

    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Summary of every non-empty room, sorted by id.
    pub fn rooms(&self) -> Vec<RoomSummary> {
        let mut rooms: Vec<RoomSummary> = self
            .rooms
            .iter()
            .map(|entry| RoomSummary {
                room: entry.key().clone(),
                members: entry.value().len(),
            })
            .filter(|summary| summary.members > 0)
            .collect();
        rooms.sort_by(|a, b| a.room.cmp(&b.room));
        rooms
    }

    /// Remove one member from one room, dropping the room once it is empty.
    fn remove_member(&self, room: &str, conn: &ConnectionId) -> bool {
        let removed = match self.rooms.get_mut(room) {
            Some(mut members) => members.remove(conn),
            None => return false,
        };

        // Re-checked under the shard lock, so a concurrent join is never lost.
        self.rooms.remove_if(room, |_, members| members.is_empty());
        removed
    }
}
