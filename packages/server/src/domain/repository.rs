//! Repository trait 定義
//!
//! ドメイン層が必要とするルームメンバーシップへのインターフェースを定義します。
//! 具体的な実装は Infrastructure 層が提供します（依存性の逆転）。

use async_trait::async_trait;

use super::{ConnectionId, Room, RoomId};

/// Room membership table
///
/// Maps room IDs to member connection IDs. Holds only non-owning references
/// to connections; the connection registry owns connection state.
///
/// Implementations must make every mutation atomic per room, and must not
/// serialize traffic of unrelated rooms behind one lock.
#[async_trait]
pub trait RoomRepository: Send + Sync {
    /// Add `connection_id` to `room_id`, creating the room if needed.
    ///
    /// Returns `true` if the connection was newly added.
    async fn join(&self, room_id: &RoomId, connection_id: ConnectionId) -> bool;

    /// Remove `connection_id` from `room_id`.
    ///
    /// Returns `true` if it was a member. Empty rooms are discarded.
    async fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool;

    /// Point-in-time snapshot of a room's members, in join order
    async fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId>;

    /// Rooms the connection currently belongs to
    async fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    /// Remove the connection from every room. Returns the rooms it left.
    async fn remove_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId>;

    async fn is_member(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool;

    async fn get_room(&self, room_id: &RoomId) -> Option<Room>;

    /// All non-empty rooms, sorted by room ID
    async fn list_rooms(&self) -> Vec<Room>;
}
