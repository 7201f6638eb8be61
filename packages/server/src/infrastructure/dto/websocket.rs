//! WebSocket wire format
//!
//! Client → Server:
//!
//! ```json
//! { "kind": "chat", "room": "group", "user": "alice", "payload": "hi" }
//! ```
//!
//! Server → Client (fan-out adds `timestamp`, RFC 3339 UTC):
//!
//! ```json
//! { "kind": "chat", "room": "group", "user": "alice", "payload": "hi",
//!   "timestamp": "2024-05-01T12:00:00.000Z" }
//! ```
//!
//! Server → Client error notice:
//!
//! ```json
//! { "kind": "error", "reason": "..." }
//! ```

use serde::{Deserialize, Serialize};

/// Event kind on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum EventKindDto {
    Join,
    Chat,
    Typing,
    StopTyping,
    Leave,
}

/// Event sent by a client
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEventDto {
    pub kind: EventKindDto,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub room: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(default)]
    pub payload: Option<String>,
}

/// Event fanned out to room members
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundEventDto {
    pub kind: EventKindDto,
    pub room: String,
    pub user: String,
    pub payload: Option<String>,
    pub timestamp: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NoticeKindDto {
    Error,
}

/// Notice sent to a single client whose event was dropped
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorNoticeDto {
    pub kind: NoticeKindDto,
    pub reason: String,
}

/// Anything the server sends over the socket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ServerMessageDto {
    Event(OutboundEventDto),
    Error(ErrorNoticeDto),
}
