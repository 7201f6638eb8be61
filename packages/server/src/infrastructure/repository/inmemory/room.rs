//! InMemory Room Repository 実装
//!
//! ドメイン層が定義する RoomRepository trait の具体的な実装。
//! `DashMap` をインメモリのメンバーシップテーブルとして使用します。
//!
//! ## ロック粒度
//!
//! - `rooms`: RoomId → Room。更新は DashMap のエントリ単位で排他されるため、
//!   無関係なルームの join/leave が互いを待つことはありません。
//! - `memberships`: ConnectionId → 参加中の RoomId 一覧（切断時の逆引き用）。
//!
//! 両方に触れる操作は必ず `rooms` のエントリを先に取り、`memberships` を後に取ります。
//! 逆順で保持する箇所はありません（デッドロック防止）。
//!
//! ## 空ルームの扱い
//!
//! 最後のメンバーが抜けた時点でルームを即座に削除します。
//! 再度 join されると新しい `created_at` で作り直されます。

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parlor_shared::time::Clock;

use crate::domain::{ConnectionId, Room, RoomId, RoomRepository, Timestamp};

/// インメモリ Room Repository 実装
pub struct InMemoryRoomRepository {
    rooms: DashMap<RoomId, Room>,
    memberships: DashMap<ConnectionId, Vec<RoomId>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryRoomRepository {
    /// 新しい InMemoryRoomRepository を作成
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            rooms: DashMap::new(),
            memberships: DashMap::new(),
            clock,
        }
    }

    fn forget_membership(&self, room_id: &RoomId, connection_id: &ConnectionId) {
        if let Some(mut rooms) = self.memberships.get_mut(connection_id) {
            rooms.retain(|id| id != room_id);
        }
        self.memberships
            .remove_if(connection_id, |_, rooms| rooms.is_empty());
    }

    fn discard_if_empty(&self, room_id: &RoomId) {
        if self
            .rooms
            .remove_if(room_id, |_, room| room.is_empty())
            .is_some()
        {
            tracing::debug!("Room '{}' is empty and was discarded", room_id);
        }
    }
}

#[async_trait]
impl RoomRepository for InMemoryRoomRepository {
    async fn join(&self, room_id: &RoomId, connection_id: ConnectionId) -> bool {
        let mut room = self.rooms.entry(room_id.clone()).or_insert_with(|| {
            tracing::info!("Room '{}' created", room_id);
            Room::new(room_id.clone(), Timestamp::new(self.clock.now_millis()))
        });

        let added = room.add_member(connection_id);
        if added {
            // rooms → memberships の順で保持
            self.memberships
                .entry(connection_id)
                .or_default()
                .push(room_id.clone());
        }
        added
    }

    async fn leave(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        let removed = match self.rooms.get_mut(room_id) {
            Some(mut room) => {
                let removed = room.remove_member(connection_id);
                // 逆引きは membership の有無にかかわらず掃除する
                self.forget_membership(room_id, connection_id);
                removed
            }
            None => {
                self.forget_membership(room_id, connection_id);
                false
            }
        };

        if removed {
            self.discard_if_empty(room_id);
        }
        removed
    }

    async fn members_of(&self, room_id: &RoomId) -> Vec<ConnectionId> {
        self.rooms
            .get(room_id)
            .map(|room| room.members.clone())
            .unwrap_or_default()
    }

    async fn rooms_of(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        self.memberships
            .get(connection_id)
            .map(|rooms| rooms.clone())
            .unwrap_or_default()
    }

    async fn remove_connection(&self, connection_id: &ConnectionId) -> Vec<RoomId> {
        let rooms = self
            .memberships
            .remove(connection_id)
            .map(|(_, rooms)| rooms)
            .unwrap_or_default();

        for room_id in &rooms {
            if let Some(mut room) = self.rooms.get_mut(room_id) {
                room.remove_member(connection_id);
            }
            self.discard_if_empty(room_id);
        }

        rooms
    }

    async fn is_member(&self, room_id: &RoomId, connection_id: &ConnectionId) -> bool {
        self.rooms
            .get(room_id)
            .is_some_and(|room| room.contains(connection_id))
    }

    async fn get_room(&self, room_id: &RoomId) -> Option<Room> {
        self.rooms.get(room_id).map(|room| room.clone())
    }

    async fn list_rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self
            .rooms
            .iter()
            .filter(|entry| !entry.is_empty())
            .map(|entry| entry.value().clone())
            .collect();
        rooms.sort_by(|a, b| a.id.cmp(&b.id));
        rooms
    }
}
