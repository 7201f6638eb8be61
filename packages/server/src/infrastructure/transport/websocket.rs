//! WebSocket を使った Transport 実装
//!
//! ## 責務
//!
//! - `ServerMessage` を JSON テキストフレームにエンコード
//! - 接続ごとの送信キュー（`UnboundedSender`）へ積む
//!
//! ## 設計ノート
//!
//! WebSocket の生成は UI 層（`ui/handler/websocket.rs`）で行われます。
//! UI 層はキューの受信側をソケットへ書き出すタスクを持ち、
//! この実装は送信側だけを保持します。キューへの送信はブロックしないため、
//! 遅い受信者が他の受信者へのファンアウトを遅らせることはありません。

use tokio::sync::mpsc;

use crate::domain::{ServerMessage, Transport, TransportError};
use crate::infrastructure::dto::conversion::encode_server_message;

/// Outbound queue of one connection (encoded JSON frames)
pub type OutboundChannel = mpsc::UnboundedSender<String>;

/// WebSocket を使った Transport 実装
pub struct WebSocketTransport {
    sender: OutboundChannel,
}

impl WebSocketTransport {
    pub fn new(sender: OutboundChannel) -> Self {
        Self { sender }
    }
}

impl Transport for WebSocketTransport {
    fn push(&self, message: &ServerMessage) -> Result<(), TransportError> {
        let frame =
            encode_server_message(message).map_err(|e| TransportError::Encode(e.to_string()))?;
        self.sender
            .send(frame)
            .map_err(|_| TransportError::Closed)
    }
}
