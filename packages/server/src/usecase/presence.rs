//! Presence / typing notifications
//!
//! Derives ephemeral events purely from membership transitions:
//!
//! - `join`: every join call, including repeated joins of the same room
//! - `leave`: explicit leave or disconnect, sent to the remaining members
//! - `typing` / `stopTyping`: relayed as-is, with no server-side debouncing
//!   or expiry. A client that never sends `stopTyping` leaves the indicator on.
//!
//! Presence payloads carry the subject's display name.

use std::sync::Arc;

use crate::domain::{Connection, EventKind, RoomId};

use super::fanout::{Broadcaster, FanoutResult};

pub struct PresenceNotifier {
    broadcaster: Arc<Broadcaster>,
}

impl PresenceNotifier {
    pub fn new(broadcaster: Arc<Broadcaster>) -> Self {
        Self { broadcaster }
    }

    /// Announce `joiner` to the other members of `room`
    pub async fn notify_joined(&self, room: &RoomId, joiner: &Connection) -> FanoutResult {
        self.announce(EventKind::Join, room, joiner).await
    }

    /// Announce that `leaver` is gone from `room`
    pub async fn notify_left(&self, room: &RoomId, leaver: &Connection) -> FanoutResult {
        self.announce(EventKind::Leave, room, leaver).await
    }

    /// Relay a typing indicator change from `sender`
    pub async fn relay_typing(
        &self,
        kind: EventKind,
        room: &RoomId,
        sender: &Connection,
    ) -> FanoutResult {
        debug_assert!(matches!(kind, EventKind::Typing | EventKind::StopTyping));
        self.announce(kind, room, sender).await
    }

    async fn announce(&self, kind: EventKind, room: &RoomId, subject: &Connection) -> FanoutResult {
        let label = subject.label();
        let event = self.broadcaster.stamp(
            kind,
            subject.id,
            room.clone(),
            label.clone(),
            Some(label),
        );
        self.broadcaster.broadcast(event).await
    }
}
