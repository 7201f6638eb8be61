//! UseCase: ルーム一覧取得処理

use std::sync::Arc;

use crate::{
    domain::{Connection, Room, RoomId, RoomRepository, Timestamp},
    infrastructure::registry::ConnectionRegistry,
};

/// ルームと、その時点のメンバーの接続情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub created_at: Timestamp,
    /// 参加順。レジストリから既に消えた接続は含まない
    pub members: Vec<Connection>,
}

impl RoomSnapshot {
    pub(crate) fn capture(room: Room, registry: &ConnectionRegistry) -> Self {
        let members = room
            .members
            .iter()
            .filter_map(|id| registry.get(id))
            .collect();
        Self {
            id: room.id,
            created_at: room.created_at,
            members,
        }
    }
}

/// ルーム一覧取得のユースケース
pub struct GetRoomsUseCase {
    registry: Arc<ConnectionRegistry>,
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomsUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, repository: Arc<dyn RoomRepository>) -> Self {
        Self {
            registry,
            repository,
        }
    }

    /// 空でない全ルームを ID 順で返す
    pub async fn execute(&self) -> Vec<RoomSnapshot> {
        self.repository
            .list_rooms()
            .await
            .into_iter()
            .map(|room| RoomSnapshot::capture(room, &self.registry))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecase::test_support::{Fixture, room};

    #[tokio::test]
    async fn test_get_rooms_lists_rooms_with_members() {
        // テスト項目: ルーム一覧は ID 順で、各ルームのメンバーの接続情報を含む
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = GetRoomsUseCase::new(fixture.registry.clone(), fixture.repository.clone());
        let (a, _rx_a) = fixture.connect();
        let (b, _rx_b) = fixture.connect();
        fixture.repository.join(&room("random"), a).await;
        fixture.repository.join(&room("general"), a).await;
        fixture.repository.join(&room("general"), b).await;

        // when (操作):
        let rooms = usecase.execute().await;

        // then (期待する結果):
        let ids: Vec<&str> = rooms.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["general", "random"]);
        let general: Vec<_> = rooms[0].members.iter().map(|c| c.id).collect();
        assert_eq!(general, vec![a, b]);
    }

    #[tokio::test]
    async fn test_get_rooms_empty() {
        // テスト項目: ルームが無ければ空の一覧
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase = GetRoomsUseCase::new(fixture.registry.clone(), fixture.repository.clone());

        // when (操作):
        let rooms = usecase.execute().await;

        // then (期待する結果):
        assert!(rooms.is_empty());
    }
}
