//! UseCase: 受信イベントのルーティング
//!
//! ## 対象ルームの決定
//!
//! 1. イベントの `room` フィールド
//! 2. 送信者が最後に join したルーム（current room）
//! 3. サーバー設定のデフォルトルーム
//!
//! どれも無ければ `RouteError::UnknownRoom`（ファンアウトなし）。
//!
//! ## 種類ごとの処理
//!
//! - `join`: ルームを（必要なら）作成して参加、表示名と current room を記録し join を通知
//! - `leave`: 参加していれば退出して leave を通知
//! - `chat` / `typing` / `stopTyping`: 送信者がメンバーの場合のみ、送信者以外へ配信
//!
//! ファンアウト中に TransportError になった受信者は、ファンアウト完了後に切断します。

use std::sync::Arc;

use crate::{
    domain::{
        Connection, ConnectionId, DisplayName, EventKind, InboundEvent, RoomId, RoomRepository,
        SendError, ServerMessage,
    },
    infrastructure::registry::ConnectionRegistry,
};

use super::{
    disconnect_participant::DisconnectParticipantUseCase,
    error::RouteError,
    fanout::{Broadcaster, FanoutResult},
    presence::PresenceNotifier,
};

/// メッセージルーター
pub struct MessageRouter {
    registry: Arc<ConnectionRegistry>,
    repository: Arc<dyn RoomRepository>,
    broadcaster: Arc<Broadcaster>,
    notifier: Arc<PresenceNotifier>,
    disconnect: Arc<DisconnectParticipantUseCase>,
    default_room: Option<RoomId>,
}

impl MessageRouter {
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        repository: Arc<dyn RoomRepository>,
        broadcaster: Arc<Broadcaster>,
        notifier: Arc<PresenceNotifier>,
        disconnect: Arc<DisconnectParticipantUseCase>,
        default_room: Option<RoomId>,
    ) -> Self {
        Self {
            registry,
            repository,
            broadcaster,
            notifier,
            disconnect,
            default_room,
        }
    }

    /// 受信イベントを処理してファンアウトする
    ///
    /// # Returns
    ///
    /// * `Ok(FanoutResult)` - 配信結果（配信なしの場合は空）
    /// * `Err(RouteError)` - 送信者が既に閉じている、対象ルームが決まらない等
    pub async fn route(
        &self,
        sender_id: ConnectionId,
        event: InboundEvent,
    ) -> Result<FanoutResult, RouteError> {
        let sender = self
            .registry
            .get(&sender_id)
            .filter(Connection::is_open)
            .ok_or(RouteError::SenderGone(sender_id))?;

        let room = self.resolve_room(&sender, event.room.clone())?;

        let result = match event.kind {
            EventKind::Join => self.join(sender, room, event.user).await?,
            EventKind::Leave => self.leave(&sender, room).await,
            EventKind::Chat => self.chat(&sender, room, event).await?,
            EventKind::Typing | EventKind::StopTyping => {
                self.typing(&sender, room, event.kind).await
            }
        };

        self.evict_failed(&result).await;
        Ok(result)
    }

    /// 1つの接続にだけエラー通知を送る（不正なイベントの破棄時）
    pub async fn reject(&self, connection_id: ConnectionId, reason: String) {
        let notice = ServerMessage::Error { reason };
        match self.registry.send(&connection_id, &notice) {
            Ok(()) => {}
            Err(e @ SendError::ConnectionGone(_)) => {
                tracing::debug!("Could not deliver error notice: {}", e);
            }
            Err(e @ SendError::TransportError(..)) => {
                tracing::warn!("Could not deliver error notice: {}", e);
                self.disconnect.execute(connection_id).await;
            }
        }
    }

    fn resolve_room(
        &self,
        sender: &Connection,
        requested: Option<RoomId>,
    ) -> Result<RoomId, RouteError> {
        requested
            .or_else(|| sender.current_room.clone())
            .or_else(|| self.default_room.clone())
            .ok_or(RouteError::UnknownRoom)
    }

    async fn join(
        &self,
        mut sender: Connection,
        room: RoomId,
        user: Option<DisplayName>,
    ) -> Result<FanoutResult, RouteError> {
        if let Some(name) = user {
            self.registry.set_display_name(&sender.id, name.clone());
            sender.display_name = Some(name);
        }

        let newly_joined = self.repository.join(&room, sender.id).await;

        // 並行して切断された場合は join を取り消す
        if !self.registry.is_open(&sender.id) {
            self.repository.leave(&room, &sender.id).await;
            return Err(RouteError::SenderGone(sender.id));
        }

        self.registry.set_current_room(&sender.id, room.clone());
        sender.current_room = Some(room.clone());

        tracing::info!(
            "'{}' joined room '{}'{}",
            sender.label(),
            room,
            if newly_joined { "" } else { " (already a member)" }
        );

        // 再 join でも join 通知は毎回送る
        Ok(self.notifier.notify_joined(&room, &sender).await)
    }

    async fn leave(&self, sender: &Connection, room: RoomId) -> FanoutResult {
        let was_member = self.repository.leave(&room, &sender.id).await;
        self.registry.clear_current_room_if(&sender.id, &room);

        if !was_member {
            tracing::debug!("'{}' left room '{}' without being a member", sender.label(), room);
            return FanoutResult::empty();
        }

        tracing::info!("'{}' left room '{}'", sender.label(), room);
        self.notifier.notify_left(&room, sender).await
    }

    async fn chat(
        &self,
        sender: &Connection,
        room: RoomId,
        event: InboundEvent,
    ) -> Result<FanoutResult, RouteError> {
        let content = event.content.ok_or(RouteError::MissingPayload)?;

        if !self.repository.is_member(&room, &sender.id).await {
            tracing::debug!(
                "Dropping chat from '{}': not a member of room '{}'",
                sender.label(),
                room
            );
            return Ok(FanoutResult::empty());
        }

        // 表示名はサーバー側で記録したものを優先する
        let user = match (&sender.display_name, event.user) {
            (Some(name), _) => name.as_str().to_string(),
            (None, Some(claimed)) => claimed.into_string(),
            (None, None) => sender.label(),
        };

        let stamped = self.broadcaster.stamp(
            EventKind::Chat,
            sender.id,
            room,
            user,
            Some(content.into_string()),
        );
        Ok(self.broadcaster.broadcast(stamped).await)
    }

    async fn typing(&self, sender: &Connection, room: RoomId, kind: EventKind) -> FanoutResult {
        if !self.repository.is_member(&room, &sender.id).await {
            tracing::debug!(
                "Dropping {:?} from '{}': not a member of room '{}'",
                kind,
                sender.label(),
                room
            );
            return FanoutResult::empty();
        }
        self.notifier.relay_typing(kind, &room, sender).await
    }

    async fn evict_failed(&self, result: &FanoutResult) {
        for connection_id in result.transport_failures() {
            self.disconnect.execute(connection_id).await;
        }
    }
}
