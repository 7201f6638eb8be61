//! UseCase 層のエラー型

use thiserror::Error;

use crate::domain::{ConnectionId, ValueObjectError};

/// Errors returned by `MessageRouter::route`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The sender is unknown or already closing
    #[error("Sender '{0}' is not an open connection")]
    SenderGone(ConnectionId),

    /// The event names no room and the sender has no current room
    #[error("No target room: the event names none and the sender has not joined any")]
    UnknownRoom,

    /// A chat event without a body
    #[error("Chat events require a payload")]
    MissingPayload,
}

/// Errors returned by `GetRoomDetailUseCase::execute`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GetRoomDetailError {
    #[error("Invalid room ID: {0}")]
    InvalidRoomId(#[from] ValueObjectError),

    #[error("Room '{0}' not found")]
    RoomNotFound(String),
}
