//! UseCase: 接続受付処理
//!
//! トランスポート層が受け付けた接続を ConnectionRegistry に登録し、
//! 不透明な ConnectionId を払い出します。失敗経路はありません。

use std::sync::Arc;

use crate::{
    domain::{ConnectionId, Transport},
    infrastructure::registry::ConnectionRegistry,
};

/// 接続受付のユースケース
pub struct ConnectParticipantUseCase {
    registry: Arc<ConnectionRegistry>,
}

impl ConnectParticipantUseCase {
    /// 新しい ConnectParticipantUseCase を作成
    pub fn new(registry: Arc<ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 接続を登録して新しい ID を返す
    ///
    /// # Arguments
    ///
    /// * `transport` - この接続へのメッセージ送信口
    pub fn execute(&self, transport: Arc<dyn Transport>) -> ConnectionId {
        let id = self.registry.register(transport);
        tracing::info!(
            "Connection '{}' accepted ({} live)",
            id,
            self.registry.len()
        );
        id
    }
}
