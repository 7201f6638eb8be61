//! Domain entities
//!
//! - `Connection`: one live client session, owned by the connection registry
//! - `Room`: a named broadcast group holding member connection IDs
//! - `InboundEvent` / `MessageEvent` / `ServerMessage`: event payloads before
//!   and after routing


use super::value_object::{ConnectionId, DisplayName, MessageContent, RoomId, Timestamp};

// ========================================
// Connection
// ========================================

/// Liveness state of a connection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Open,
    Closing,
    Closed,
}

/// One logical client session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Connection {
    pub id: ConnectionId,
    pub state: ConnectionState,
    /// Set by the client through `join`
    pub display_name: Option<DisplayName>,
    /// Room most recently joined and not yet left
    pub current_room: Option<RoomId>,
    pub connected_at: Timestamp,
}

impl Connection {
    pub fn new(id: ConnectionId, connected_at: Timestamp) -> Self {
        Self {
            id,
            state: ConnectionState::Open,
            display_name: None,
            current_room: None,
            connected_at,
        }
    }

    pub fn is_open(&self) -> bool {
        self.state == ConnectionState::Open
    }

    /// Name shown to other members. Falls back to the connection ID.
    pub fn label(&self) -> String {
        match &self.display_name {
            Some(name) => name.as_str().to_string(),
            None => self.id.to_string(),
        }
    }
}

// ========================================
// Room
// ========================================

/// A named broadcast group
///
/// Members are kept unique and in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Room {
    pub id: RoomId,
    pub members: Vec<ConnectionId>,
    pub created_at: Timestamp,
}

impl Room {
    pub fn new(id: RoomId, created_at: Timestamp) -> Self {
        Self {
            id,
            members: Vec::new(),
            created_at,
        }
    }

    /// Add a member. Returns `false` if it was already present.
    pub fn add_member(&mut self, connection_id: ConnectionId) -> bool {
        if self.contains(&connection_id) {
            return false;
        }
        self.members.push(connection_id);
        true
    }

    /// Remove a member. Returns `false` if it was not present.
    pub fn remove_member(&mut self, connection_id: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|id| id != connection_id);
        self.members.len() != before
    }

    pub fn contains(&self, connection_id: &ConnectionId) -> bool {
        self.members.contains(connection_id)
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

// ========================================
// Events
// ========================================

/// Kind of a chat/presence event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Join,
    Chat,
    Typing,
    StopTyping,
    /// Explicit leave, also used to announce a disconnect
    Leave,
}

/// A decoded, validated event received from a client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundEvent {
    pub kind: EventKind,
    /// Target room; `None` means the sender's current room
    pub room: Option<RoomId>,
    /// Display name claimed by the client
    pub user: Option<DisplayName>,
    /// Chat body (present only for `Chat`)
    pub content: Option<MessageContent>,
}

impl InboundEvent {
    pub fn join(room: RoomId, user: DisplayName) -> Self {
        Self {
            kind: EventKind::Join,
            room: Some(room),
            user: Some(user),
            content: None,
        }
    }

    pub fn chat(room: RoomId, content: MessageContent) -> Self {
        Self {
            kind: EventKind::Chat,
            room: Some(room),
            user: None,
            content: Some(content),
        }
    }

    pub fn signal(kind: EventKind, room: Option<RoomId>) -> Self {
        Self {
            kind,
            room,
            user: None,
            content: None,
        }
    }
}

/// An event stamped by the server and fanned out to room members
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEvent {
    pub kind: EventKind,
    pub sender: ConnectionId,
    pub room: RoomId,
    /// Sender display name
    pub user: String,
    /// Chat body for `Chat`, sender display name for presence events
    pub payload: Option<String>,
    /// Assigned once per fan-out
    pub timestamp: Timestamp,
}

/// Anything the server pushes to a single connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerMessage {
    Event(MessageEvent),
    /// Notice for an event that was dropped (e.g. malformed input)
    Error { reason: String },
}
