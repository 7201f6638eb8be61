//! Room fan-out
//!
//! Delivers one stamped event to every member of a room except its sender.
//! Delivery is best-effort: each recipient is sent to independently and
//! failures are collected, never aborting the rest of the fan-out.

use std::sync::Arc;

use parlor_shared::time::Clock;

use crate::{
    domain::{
        ConnectionId, EventKind, MessageEvent, RoomId, RoomRepository, SendError, ServerMessage,
        Timestamp,
    },
    infrastructure::registry::ConnectionRegistry,
};

/// Outcome of one fan-out
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanoutResult {
    /// The event as delivered (`None` when nothing was fanned out)
    pub event: Option<MessageEvent>,
    pub delivered: Vec<ConnectionId>,
    pub failed: Vec<SendError>,
}

impl FanoutResult {
    /// Nothing was fanned out
    pub fn empty() -> Self {
        Self::default()
    }

    /// Recipients whose transport failed (they must be disconnected)
    pub fn transport_failures(&self) -> Vec<ConnectionId> {
        self.failed
            .iter()
            .filter(|e| matches!(e, SendError::TransportError(..)))
            .map(SendError::connection_id)
            .collect()
    }
}

/// Stamps events and fans them out to room members
pub struct Broadcaster {
    registry: Arc<ConnectionRegistry>,
    repository: Arc<dyn RoomRepository>,
    clock: Arc<dyn Clock>,
}

impl Broadcaster {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        repository: Arc<dyn RoomRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            registry,
            repository,
            clock,
        }
    }

    /// Build an event stamped with the current time
    pub fn stamp(
        &self,
        kind: EventKind,
        sender: ConnectionId,
        room: RoomId,
        user: String,
        payload: Option<String>,
    ) -> MessageEvent {
        MessageEvent {
            kind,
            sender,
            room,
            user,
            payload,
            timestamp: Timestamp::new(self.clock.now_millis()),
        }
    }

    /// Send `event` to `members_of(event.room) \ {event.sender}`
    pub async fn broadcast(&self, event: MessageEvent) -> FanoutResult {
        let targets: Vec<ConnectionId> = self
            .repository
            .members_of(&event.room)
            .await
            .into_iter()
            .filter(|id| *id != event.sender)
            .collect();

        let message = ServerMessage::Event(event.clone());
        let mut delivered = Vec::with_capacity(targets.len());
        let mut failed = Vec::new();

        for target in targets {
            match self.registry.send(&target, &message) {
                Ok(()) => delivered.push(target),
                Err(e @ SendError::ConnectionGone(_)) => {
                    tracing::debug!("Skipping recipient during fan-out: {}", e);
                    failed.push(e);
                }
                Err(e @ SendError::TransportError(..)) => {
                    tracing::warn!("Failed to push event during fan-out: {}", e);
                    failed.push(e);
                }
            }
        }

        tracing::debug!(
            "Fanned out {:?} in room '{}' to {} recipient(s), {} failure(s)",
            event.kind,
            event.room,
            delivered.len(),
            failed.len()
        );

        FanoutResult {
            event: Some(event),
            delivered,
            failed,
        }
    }
}
