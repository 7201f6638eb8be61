//! UseCase: ルーム詳細取得処理

use std::sync::Arc;

use crate::{
    domain::{RoomId, RoomRepository},
    infrastructure::registry::ConnectionRegistry,
};

use super::{error::GetRoomDetailError, get_rooms::RoomSnapshot};

/// ルーム詳細取得のユースケース
pub struct GetRoomDetailUseCase {
    registry: Arc<ConnectionRegistry>,
    repository: Arc<dyn RoomRepository>,
}

impl GetRoomDetailUseCase {
    pub fn new(registry: Arc<ConnectionRegistry>, repository: Arc<dyn RoomRepository>) -> Self {
        Self {
            registry,
            repository,
        }
    }

    /// ルーム詳細を取得
    ///
    /// # Errors
    ///
    /// * `InvalidRoomId` - ルーム ID として不正な文字列
    /// * `RoomNotFound` - 該当するルームが無い（空になったルームは削除済み）
    pub async fn execute(&self, room_id: String) -> Result<RoomSnapshot, GetRoomDetailError> {
        let id = RoomId::new(room_id)?;
        let room = self
            .repository
            .get_room(&id)
            .await
            .ok_or_else(|| GetRoomDetailError::RoomNotFound(id.into_string()))?;
        Ok(RoomSnapshot::capture(room, &self.registry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, ValueObjectError};
    use crate::usecase::test_support::{Fixture, room};

    #[tokio::test]
    async fn test_get_room_detail_success() {
        // テスト項目: 存在するルームの詳細を取得できる
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase =
            GetRoomDetailUseCase::new(fixture.registry.clone(), fixture.repository.clone());
        let (a, _rx_a) = fixture.connect();
        fixture
            .registry
            .set_display_name(&a, DisplayName::new("alice".to_string()).unwrap());
        fixture.repository.join(&room("general"), a).await;

        // when (操作):
        let detail = usecase.execute("general".to_string()).await.unwrap();

        // then (期待する結果):
        assert_eq!(detail.id, room("general"));
        assert_eq!(detail.members.len(), 1);
        assert_eq!(detail.members[0].label(), "alice");
    }

    #[tokio::test]
    async fn test_get_room_detail_not_found() {
        // テスト項目: 存在しないルームは RoomNotFound
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase =
            GetRoomDetailUseCase::new(fixture.registry.clone(), fixture.repository.clone());

        // when (操作):
        let result = usecase.execute("nowhere".to_string()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(GetRoomDetailError::RoomNotFound("nowhere".to_string()))
        );
    }

    #[tokio::test]
    async fn test_get_room_detail_invalid_id() {
        // テスト項目: 空のルーム ID は InvalidRoomId
        // given (前提条件):
        let fixture = Fixture::new();
        let usecase =
            GetRoomDetailUseCase::new(fixture.registry.clone(), fixture.repository.clone());

        // when (操作):
        let result = usecase.execute("   ".to_string()).await;

        // then (期待する結果):
        assert_eq!(
            result,
            Err(GetRoomDetailError::InvalidRoomId(ValueObjectError::EmptyRoomId))
        );
    }
}
