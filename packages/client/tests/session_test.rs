//! Client session tests against an in-process Parlor server.

use std::{sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use parlor_client::{ClientError, domain::ClientState, run_client_session};
use parlor_server::{config::ServerConfig, ui::Server};
use parlor_shared::time::SystemClock;
use serde_json::{Value, json};
use tokio::{sync::mpsc, time};
use tokio_tungstenite::tungstenite::Message;

const TIMEOUT: Duration = Duration::from_secs(5);

async fn start_server() -> String {
    let server = Server::new(&ServerConfig::default(), Arc::new(SystemClock));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        server
            .serve(listener, std::future::pending())
            .await
            .expect("serve");
    });
    format!("{addr}")
}

async fn member_count(addr: &str, room: &str) -> usize {
    let response = reqwest::get(format!("http://{addr}/api/rooms/{room}"))
        .await
        .expect("room detail request");
    if response.status() == reqwest::StatusCode::NOT_FOUND {
        return 0;
    }
    let body: Value = response.json().await.expect("parse room detail");
    body["members"].as_array().map(Vec::len).unwrap_or(0)
}

async fn wait_for_member_count(addr: &str, room: &str, expected: usize) {
    let deadline = time::Instant::now() + TIMEOUT;
    while member_count(addr, room).await != expected {
        assert!(time::Instant::now() < deadline, "room never reached {expected}");
        time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_session_joins_room_and_sends_chat() {
    // テスト項目: セッションは接続直後にルームへ参加し、入力行を chat として送る
    // given (前提条件):
    let addr = start_server().await;
    let (mut observer, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("ws connect");
    observer
        .send(Message::Text(
            json!({ "kind": "join", "room": "general", "user": "observer" })
                .to_string()
                .into(),
        ))
        .await
        .expect("send join");
    wait_for_member_count(&addr, "general", 1).await;

    let (input_tx, mut input_rx) = mpsc::unbounded_channel();
    let url = format!("ws://{addr}/ws");
    let session = tokio::spawn(async move {
        let mut state = ClientState::new("alice".to_string(), Some("general".to_string()));
        run_client_session(&url, &mut state, &mut input_rx).await
    });
    wait_for_member_count(&addr, "general", 2).await;

    // when (操作):
    input_tx.send("hello from alice".to_string()).unwrap();

    // then (期待する結果):
    let mut frames = Vec::new();
    while frames.len() < 2 {
        let msg = time::timeout(TIMEOUT, observer.next())
            .await
            .expect("timeout")
            .expect("stream ended")
            .expect("read error");
        if let Message::Text(text) = msg {
            frames.push(serde_json::from_str::<Value>(text.as_str()).unwrap());
        }
    }
    assert_eq!(frames[0]["kind"], "join");
    assert_eq!(frames[0]["user"], "alice");
    assert_eq!(frames[1]["kind"], "chat");
    assert_eq!(frames[1]["payload"], "hello from alice");

    // /quit でセッションが正常終了し、ルームから外れる
    input_tx.send("/quit".to_string()).unwrap();
    let result = time::timeout(TIMEOUT, session).await.unwrap().unwrap();
    assert!(result.is_ok());
    wait_for_member_count(&addr, "general", 1).await;
}

#[tokio::test]
async fn test_session_with_unsupported_scheme_is_invalid_url() {
    // テスト項目: ws 以外のスキームの URL は InvalidUrl になる
    // given (前提条件):
    let (_input_tx, mut input_rx) = mpsc::unbounded_channel();
    let mut state = ClientState::new("alice".to_string(), None);

    // when (操作):
    let result = run_client_session("http://127.0.0.1:1/ws", &mut state, &mut input_rx).await;

    // then (期待する結果):
    assert!(matches!(result, Err(ClientError::InvalidUrl(_))));
}

#[tokio::test]
async fn test_session_without_server_is_connection_error() {
    // テスト項目: サーバーが無い場合は ConnectionError になる
    // given (前提条件):
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    let (_input_tx, mut input_rx) = mpsc::unbounded_channel();
    let mut state = ClientState::new("alice".to_string(), None);

    // when (操作):
    let result = run_client_session(&format!("ws://{addr}/ws"), &mut state, &mut input_rx).await;

    // then (期待する結果):
    assert!(matches!(result, Err(ClientError::ConnectionError(_))));
}
