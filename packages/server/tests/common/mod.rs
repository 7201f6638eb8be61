//! Shared helpers for the integration tests.
//!
//! Each test starts its own server on an ephemeral port in this process and
//! talks to it with real WebSocket / HTTP clients.

#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use parlor_server::{config::ServerConfig, ui::Server};
use parlor_shared::time::SystemClock;
use serde_json::Value;
use tokio::{net::TcpStream, sync::oneshot, task::JoinHandle, time};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, tungstenite::Message};

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

const RECV_TIMEOUT: Duration = Duration::from_secs(5);

/// A server running in a background task; stopped on drop
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    pub async fn start() -> Self {
        Self::start_with_default_room(None).await
    }

    pub async fn start_with_default_room(default_room: Option<&str>) -> Self {
        let config = ServerConfig::new(
            "127.0.0.1".to_string(),
            0,
            default_room.map(str::to_string),
        )
        .expect("valid config");
        let server = Server::new(&config, Arc::new(SystemClock));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind");
        let addr = listener.local_addr().expect("local addr");

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let shutdown = async {
                let _ = shutdown_rx.await;
            };
            server.serve(listener, shutdown).await.expect("serve");
        });

        Self {
            addr,
            shutdown: Some(shutdown_tx),
            handle: Some(handle),
        }
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Open a WebSocket connection to `/ws`
    pub async fn connect(&self) -> WsStream {
        let (ws_stream, _) = tokio_tungstenite::connect_async(self.ws_url())
            .await
            .expect("ws connect");
        ws_stream
    }

    /// Connect and join `room` as `user`, waiting until the server has
    /// registered the membership
    pub async fn join(&self, room: &str, user: &str) -> WsStream {
        let mut ws = self.connect().await;
        let before = self.member_count(room).await;
        send_json(
            &mut ws,
            serde_json::json!({ "kind": "join", "room": room, "user": user }),
        )
        .await;
        self.wait_for_member_count(room, before + 1).await;
        ws
    }

    /// Number of members in `room` as reported by the HTTP API (0 if absent)
    pub async fn member_count(&self, room: &str) -> usize {
        let response = reqwest::get(self.http_url(&format!("/api/rooms/{room}")))
            .await
            .expect("room detail request");
        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return 0;
        }
        let body: Value = response.json().await.expect("parse room detail");
        body["members"].as_array().map(Vec::len).unwrap_or(0)
    }

    /// Poll the HTTP API until `room` has exactly `expected` members
    pub async fn wait_for_member_count(&self, room: &str, expected: usize) {
        let deadline = time::Instant::now() + RECV_TIMEOUT;
        loop {
            if self.member_count(room).await == expected {
                return;
            }
            assert!(
                time::Instant::now() < deadline,
                "room '{room}' never reached {expected} member(s)"
            );
            time::sleep(Duration::from_millis(20)).await;
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

pub async fn send_json(ws: &mut WsStream, value: Value) {
    send_text(ws, &value.to_string()).await;
}

pub async fn send_text(ws: &mut WsStream, text: &str) {
    ws.send(Message::Text(text.to_string().into()))
        .await
        .expect("ws send");
}

/// Receive the next text frame as JSON, skipping ping/pong
pub async fn recv_json(ws: &mut WsStream) -> Value {
    loop {
        let msg = time::timeout(RECV_TIMEOUT, ws.next())
            .await
            .expect("timeout waiting for a frame")
            .expect("stream ended")
            .expect("ws read error");
        match msg {
            Message::Text(text) => {
                return serde_json::from_str(text.as_str()).expect("parse frame");
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Expected a text frame, got: {other:?}"),
        }
    }
}

/// Receive frames until one of the given kind arrives
pub async fn recv_kind(ws: &mut WsStream, kind: &str) -> Value {
    loop {
        let frame = recv_json(ws).await;
        if frame["kind"] == kind {
            return frame;
        }
    }
}

/// Assert that no text frame arrives within `wait`
pub async fn assert_silent(ws: &mut WsStream, wait: Duration) {
    if let Ok(Some(Ok(Message::Text(text)))) = time::timeout(wait, ws.next()).await {
        panic!("Expected no frame, got: {}", text.as_str());
    }
}
