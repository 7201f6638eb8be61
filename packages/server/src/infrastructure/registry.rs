//! Connection registry
//!
//! Owns every live connection together with its transport handle.
//! Entries live in a `DashMap`, so state changes are serialized per connection
//! and never block unrelated connections.
//!
//! Lifecycle: `register` (Open) → `mark_closing` (Closing) → `mark_closed`
//! (Closed, entry removed). A `Closed` connection is never observable here.

use std::sync::Arc;

use dashmap::DashMap;
use parlor_shared::time::Clock;

use crate::domain::{
    Connection, ConnectionId, ConnectionState, DisplayName, RoomId, SendError, ServerMessage,
    Timestamp, Transport,
};

struct ConnectionSlot {
    connection: Connection,
    transport: Arc<dyn Transport>,
}

/// Registry of live connections
pub struct ConnectionRegistry {
    connections: DashMap<ConnectionId, ConnectionSlot>,
    clock: Arc<dyn Clock>,
}

impl ConnectionRegistry {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            connections: DashMap::new(),
            clock,
        }
    }

    /// Register a freshly accepted connection and return its new ID
    pub fn register(&self, transport: Arc<dyn Transport>) -> ConnectionId {
        let id = ConnectionId::generate();
        let connection = Connection::new(id, Timestamp::new(self.clock.now_millis()));
        self.connections.insert(
            id,
            ConnectionSlot {
                connection,
                transport,
            },
        );
        tracing::debug!("Connection '{}' registered", id);
        id
    }

    /// `Open → Closing`. No-op for any other state or unknown IDs.
    pub fn mark_closing(&self, id: &ConnectionId) {
        if let Some(mut slot) = self.connections.get_mut(id)
            && slot.connection.state == ConnectionState::Open
        {
            slot.connection.state = ConnectionState::Closing;
            tracing::debug!("Connection '{}' is closing", id);
        }
    }

    /// Transition to `Closed` and drop the entry (and its transport).
    ///
    /// Returns the final snapshot only to the caller that removed the entry,
    /// so eviction work downstream runs exactly once per connection.
    pub fn mark_closed(&self, id: &ConnectionId) -> Option<Connection> {
        let (_, slot) = self.connections.remove(id)?;
        let mut connection = slot.connection;
        connection.state = ConnectionState::Closed;
        tracing::debug!("Connection '{}' closed", id);
        Some(connection)
    }

    /// Push a message to one connection.
    ///
    /// Does not wait for the peer to receive it. The map entry is released
    /// before the transport is called.
    pub fn send(&self, id: &ConnectionId, message: &ServerMessage) -> Result<(), SendError> {
        let transport = {
            let slot = self
                .connections
                .get(id)
                .ok_or(SendError::ConnectionGone(*id))?;
            if !slot.connection.is_open() {
                return Err(SendError::ConnectionGone(*id));
            }
            slot.transport.clone()
        };

        transport
            .push(message)
            .map_err(|e| SendError::TransportError(*id, e))
    }

    pub fn get(&self, id: &ConnectionId) -> Option<Connection> {
        self.connections.get(id).map(|slot| slot.connection.clone())
    }

    pub fn is_open(&self, id: &ConnectionId) -> bool {
        self.connections
            .get(id)
            .is_some_and(|slot| slot.connection.is_open())
    }

    /// Returns `false` if the connection is unknown
    pub fn set_display_name(&self, id: &ConnectionId, name: DisplayName) -> bool {
        match self.connections.get_mut(id) {
            Some(mut slot) => {
                slot.connection.display_name = Some(name);
                true
            }
            None => false,
        }
    }

    pub fn set_current_room(&self, id: &ConnectionId, room: RoomId) -> bool {
        match self.connections.get_mut(id) {
            Some(mut slot) => {
                slot.connection.current_room = Some(room);
                true
            }
            None => false,
        }
    }

    /// Clear the current room, but only if it is `room`
    pub fn clear_current_room_if(&self, id: &ConnectionId, room: &RoomId) {
        if let Some(mut slot) = self.connections.get_mut(id)
            && slot.connection.current_room.as_ref() == Some(room)
        {
            slot.connection.current_room = None;
        }
    }

    /// Snapshot of the IDs currently registered
    pub fn ids(&self) -> Vec<ConnectionId> {
        self.connections.iter().map(|entry| *entry.key()).collect()
    }

    pub fn len(&self) -> usize {
        self.connections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.is_empty()
    }

    /// Close every connection and drop all transports.
    ///
    /// Returns the IDs that were evicted. Room memberships are left alone;
    /// callers remove them from the room table.
    pub fn close(&self) -> Vec<ConnectionId> {
        let ids = self.ids();
        for id in &ids {
            self.mark_closing(id);
        }
        let closed: Vec<ConnectionId> = ids
            .into_iter()
            .filter(|id| self.mark_closed(id).is_some())
            .collect();
        tracing::info!("Connection registry closed ({} connections)", closed.len());
        closed
    }
}
