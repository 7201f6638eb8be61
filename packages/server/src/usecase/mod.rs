//! UseCase layer: connection lifecycle, routing and fan-out.

pub mod connect_participant;
pub mod disconnect_participant;
pub mod error;
pub mod fanout;
pub mod get_room_detail;
pub mod get_rooms;
pub mod presence;
pub mod route_message;

#[cfg(test)]
mod test_support;

pub use connect_participant::ConnectParticipantUseCase;
pub use disconnect_participant::DisconnectParticipantUseCase;
pub use error::{GetRoomDetailError, RouteError};
pub use fanout::{Broadcaster, FanoutResult};
pub use get_room_detail::GetRoomDetailUseCase;
pub use get_rooms::{GetRoomsUseCase, RoomSnapshot};
pub use presence::PresenceNotifier;
pub use route_message::MessageRouter;
