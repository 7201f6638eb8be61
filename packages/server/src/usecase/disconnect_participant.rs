//! UseCase: 接続切断処理
//!
//! ## 処理の流れ
//!
//! 1. `mark_closing`（以降この接続への送信は ConnectionGone）
//! 2. 全ルームからメンバーシップを削除
//! 3. 各ルームの残りのメンバーへ `leave` を通知
//! 4. `mark_closed`（レジストリから削除、トランスポートを破棄）
//!
//! `leave` 通知中に TransportError になった受信者も同じ手順で切断します。
//! 再帰せず、作業リストで順に処理します。
//!
//! ## 冪等性
//!
//! 同じ接続に対して複数回呼ばれても、実際に削除を行うのは1回だけです。

use std::sync::Arc;

use crate::{
    domain::{Connection, ConnectionId, RoomRepository},
    infrastructure::registry::ConnectionRegistry,
};

use super::presence::PresenceNotifier;

/// 接続切断のユースケース
pub struct DisconnectParticipantUseCase {
    registry: Arc<ConnectionRegistry>,
    repository: Arc<dyn RoomRepository>,
    notifier: Arc<PresenceNotifier>,
}

impl DisconnectParticipantUseCase {
    /// 新しい DisconnectParticipantUseCase を作成
    pub fn new(
        registry: Arc<ConnectionRegistry>,
        repository: Arc<dyn RoomRepository>,
        notifier: Arc<PresenceNotifier>,
    ) -> Self {
        Self {
            registry,
            repository,
            notifier,
        }
    }

    /// 接続を切断し、レジストリと全ルームから取り除く
    ///
    /// # Returns
    ///
    /// * `Some(Connection)` - この呼び出しで削除した接続の最終状態（Closed）
    /// * `None` - 既に削除済み、または未知の接続
    pub async fn execute(&self, connection_id: ConnectionId) -> Option<Connection> {
        let mut requested = None;
        let mut pending = vec![connection_id];

        while let Some(current) = pending.pop() {
            let Some((closed, failures)) = self.evict(current).await else {
                continue;
            };
            if current == connection_id {
                requested = closed;
            }
            pending.extend(failures);
        }

        requested
    }

    /// サーバー停止時に全接続を切断する
    ///
    /// 切断した接続の数を返します。
    pub async fn disconnect_all(&self) -> usize {
        let mut closed = 0;
        for connection_id in self.registry.ids() {
            if self.execute(connection_id).await.is_some() {
                closed += 1;
            }
        }

        // 走査中に登録された接続
        for connection_id in self.registry.close() {
            self.repository.remove_connection(&connection_id).await;
            closed += 1;
        }

        closed
    }

    /// 1接続分の削除。leave 通知で失敗した受信者の ID も返す
    ///
    /// 他の呼び出しが先に `mark_closed` した場合も、失敗した受信者は返す。
    async fn evict(
        &self,
        connection_id: ConnectionId,
    ) -> Option<(Option<Connection>, Vec<ConnectionId>)> {
        let snapshot = self.registry.get(&connection_id)?;
        self.registry.mark_closing(&connection_id);

        let rooms = self.repository.remove_connection(&connection_id).await;

        let mut failures = Vec::new();
        for room in &rooms {
            let result = self.notifier.notify_left(room, &snapshot).await;
            failures.extend(result.transport_failures());
        }

        let closed = self.registry.mark_closed(&connection_id);
        if closed.is_some() {
            tracing::info!(
                "Connection '{}' ({}) disconnected, left {} room(s)",
                connection_id,
                snapshot.label(),
                rooms.len()
            );
        }

        Some((closed, failures))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::domain::{
        ConnectionId, ConnectionState, DisplayName, EventKind, RoomRepository, SendError,
        ServerMessage, TransportError, transport::MockTransport,
    };
    use crate::usecase::test_support::{Fixture, drain, room};

    // ========================================
    // テスト作業記録
    // ========================================
    // 【何をテストするか】
    // - 切断で全ルームとレジストリから削除されること
    // - 残りのメンバーへ leave が通知されること
    // - 冪等性（2回目は None）
    // - leave 通知中の送信失敗が連鎖的に切断されること
    //   （並行して別の呼び出しが先に閉じた場合も含む）
    // - サーバー停止時の全切断でルームも空になること
    // ========================================

    #[tokio::test]
    async fn test_disconnect_removes_from_rooms_and_registry() {
        // テスト項目: 切断で全ルームとレジストリから取り除かれ、以降の send は ConnectionGone
        // given (前提条件):
        let fixture = Fixture::new();
        let (a, _rx_a) = fixture.connect();
        fixture.repository.join(&room("general"), a).await;
        fixture.repository.join(&room("random"), a).await;

        // when (操作):
        let closed = fixture.disconnect.execute(a).await;

        // then (期待する結果):
        assert_eq!(closed.unwrap().state, ConnectionState::Closed);
        assert!(fixture.repository.rooms_of(&a).await.is_empty());
        assert!(fixture.repository.members_of(&room("general")).await.is_empty());
        assert!(fixture.registry.get(&a).is_none());
        assert_eq!(
            fixture.registry.send(
                &a,
                &ServerMessage::Error {
                    reason: "x".to_string()
                }
            ),
            Err(SendError::ConnectionGone(a))
        );
    }

    #[tokio::test]
    async fn test_disconnect_notifies_remaining_members() {
        // テスト項目: 残りのメンバーに leave が通知される
        // given (前提条件):
        let fixture = Fixture::new();
        let (a, _rx_a) = fixture.connect();
        let (b, mut rx_b) = fixture.connect();
        fixture
            .registry
            .set_display_name(&a, DisplayName::new("alice".to_string()).unwrap());
        fixture.repository.join(&room("group"), a).await;
        fixture.repository.join(&room("group"), b).await;

        // when (操作):
        fixture.disconnect.execute(a).await;

        // then (期待する結果):
        let received = drain(&mut rx_b);
        assert_eq!(received.len(), 1);
        let ServerMessage::Event(event) = &received[0] else {
            panic!("expected an event, got {:?}", received[0]);
        };
        assert_eq!(event.kind, EventKind::Leave);
        assert_eq!(event.user, "alice");
        assert_eq!(event.room, room("group"));
    }

    #[tokio::test]
    async fn test_disconnect_is_idempotent() {
        // テスト項目: 2回目の切断は何もしない
        // given (前提条件):
        let fixture = Fixture::new();
        let (a, _rx_a) = fixture.connect();
        let (b, mut rx_b) = fixture.connect();
        fixture.repository.join(&room("group"), a).await;
        fixture.repository.join(&room("group"), b).await;

        // when (操作):
        let first = fixture.disconnect.execute(a).await;
        let second = fixture.disconnect.execute(a).await;

        // then (期待する結果): leave 通知も1回だけ
        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(drain(&mut rx_b).len(), 1);
    }

    #[tokio::test]
    async fn test_disconnect_cascades_transport_failures() {
        // テスト項目: leave 通知で TransportError になった受信者も切断される
        // given (前提条件):
        let fixture = Fixture::new();
        let (a, _rx_a) = fixture.connect();
        let broken = fixture.connect_failing();
        let (c, mut rx_c) = fixture.connect();
        for id in [a, broken, c] {
            fixture.repository.join(&room("group"), id).await;
        }

        // when (操作):
        fixture.disconnect.execute(a).await;

        // then (期待する結果): broken も削除され、c は2人分の leave を受け取る
        assert!(fixture.registry.get(&broken).is_none());
        assert_eq!(fixture.repository.members_of(&room("group")).await, vec![c]);
        let leaves = drain(&mut rx_c)
            .into_iter()
            .filter(|m| matches!(m, ServerMessage::Event(e) if e.kind == EventKind::Leave))
            .count();
        assert_eq!(leaves, 2);
    }

    #[tokio::test]
    async fn test_cascade_survives_concurrent_close() {
        // テスト項目: 切断中の接続が別の呼び出しで先に閉じられても、送信失敗した受信者は切断される
        // given (前提条件): broken への送信は、先に a を閉じてから失敗する
        let fixture = Fixture::new();
        let (a, _rx_a) = fixture.connect();
        let registry = fixture.registry.clone();
        let mut transport = MockTransport::new();
        transport.expect_push().returning(move |_| {
            registry.mark_closed(&a);
            Err(TransportError::Closed)
        });
        let broken = fixture.connect.execute(Arc::new(transport));
        let (c, _rx_c) = fixture.connect();
        for id in [a, broken, c] {
            fixture.repository.join(&room("group"), id).await;
        }

        // when (操作):
        fixture.disconnect.execute(a).await;

        // then (期待する結果):
        assert!(fixture.registry.get(&a).is_none());
        assert!(fixture.registry.get(&broken).is_none());
        assert_eq!(fixture.repository.members_of(&room("group")).await, vec![c]);
    }

    #[tokio::test]
    async fn test_disconnect_all_empties_registry_and_rooms() {
        // テスト項目: 全切断でレジストリとルームの両方が空になり、残りのメンバーへ leave が届く
        // given (前提条件):
        let fixture = Fixture::new();
        let (a, _rx_a) = fixture.connect();
        let (b, _rx_b) = fixture.connect();
        let (c, _rx_c) = fixture.connect();
        fixture.repository.join(&room("group"), a).await;
        fixture.repository.join(&room("group"), b).await;
        fixture.repository.join(&room("other"), c).await;

        // when (操作):
        let closed = fixture.disconnect.disconnect_all().await;

        // then (期待する結果):
        assert_eq!(closed, 3);
        assert!(fixture.registry.is_empty());
        assert!(fixture.repository.list_rooms().await.is_empty());
        assert!(fixture.repository.rooms_of(&a).await.is_empty());
        assert!(fixture.disconnect.execute(a).await.is_none());
    }

    #[tokio::test]
    async fn test_disconnect_unknown_connection() {
        // テスト項目: 未知の接続の切断は None を返す
        // given (前提条件):
        let fixture = Fixture::new();

        // when (操作):
        let result = fixture
            .disconnect
            .execute(ConnectionId::generate())
            .await;

        // then (期待する結果):
        assert!(result.is_none());
    }
}
