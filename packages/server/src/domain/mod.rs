//! Domain layer: entities, value objects and the interfaces the use cases
//! depend on (`RoomRepository`, `Transport`).

pub mod entity;
pub mod error;
pub mod repository;
pub mod transport;
pub mod value_object;

pub use entity::{
    Connection, ConnectionState, EventKind, InboundEvent, MessageEvent, Room, ServerMessage,
};
pub use error::{SendError, TransportError, ValueObjectError};
pub use repository::RoomRepository;
pub use transport::Transport;
pub use value_object::{ConnectionId, DisplayName, MessageContent, RoomId, Timestamp};
