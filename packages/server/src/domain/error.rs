//! Domain error types

use thiserror::Error;

use super::value_object::ConnectionId;

/// Value object validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValueObjectError {
    #[error("Room ID must not be empty")]
    EmptyRoomId,

    #[error("Room ID must be at most {0} characters")]
    RoomIdTooLong(usize),

    #[error("Room ID must not contain control characters")]
    InvalidRoomId,

    #[error("Display name must not be empty")]
    EmptyDisplayName,

    #[error("Display name must be at most {0} characters")]
    DisplayNameTooLong(usize),

    #[error("Message content must not be empty")]
    EmptyMessageContent,

    #[error("Message content must be at most {0} characters")]
    MessageContentTooLong(usize),
}

/// Failure reported by a connection's underlying transport
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The peer side of the outbound queue is gone (socket writer stopped)
    #[error("Transport channel closed")]
    Closed,

    /// The event could not be encoded for the wire
    #[error("Failed to encode message: {0}")]
    Encode(String),
}

/// Errors returned by `ConnectionRegistry::send`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SendError {
    /// Recipient is unknown, closing or closed
    #[error("Connection '{0}' is gone")]
    ConnectionGone(ConnectionId),

    /// The underlying transport write failed; the connection must be evicted
    #[error("Transport error on connection '{0}': {1}")]
    TransportError(ConnectionId, TransportError),
}

impl SendError {
    /// Connection the failed send was addressed to
    pub fn connection_id(&self) -> ConnectionId {
        match self {
            SendError::ConnectionGone(id) | SendError::TransportError(id, _) => *id,
        }
    }
}
