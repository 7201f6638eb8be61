//! WebSocket client session management.

use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use parlor_server::infrastructure::dto::websocket::{InboundEventDto, ServerMessageDto};
use parlor_shared::time::now_millis;
use tokio::{net::TcpStream, sync::mpsc, task::JoinHandle};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, protocol::Message},
};

use crate::{
    domain::{ClientState, Command, parse_command},
    error::ClientError,
};

use super::{formatter::MessageFormatter, ui::redisplay_prompt};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Run one WebSocket client session
///
/// Rejoins `state.room` right after connecting, then sends one event per input
/// line until the user quits or the connection drops.
///
/// # Returns
///
/// * `Ok(())` - The user quit (`/quit`, Ctrl+C or end of input)
/// * `Err(ClientError)` - The connection could not be opened or was lost
pub async fn run_client_session(
    url: &str,
    state: &mut ClientState,
    input: &mut mpsc::UnboundedReceiver<String>,
) -> Result<(), ClientError> {
    let (ws_stream, _response) = connect_async(url).await.map_err(|e| match e {
        tungstenite::Error::Url(_) => ClientError::InvalidUrl(url.to_string()),
        other => ClientError::ConnectionError(other.to_string()),
    })?;

    tracing::info!("Connected to chat server!");
    print!(
        "{}",
        MessageFormatter::format_welcome(&state.user, state.room.as_deref())
    );

    let (mut write, read) = ws_stream.split();

    if let Some(rejoin) = state.rejoin_event() {
        send_event(&mut write, &rejoin).await?;
    }
    redisplay_prompt(&state.user);

    // Spawn a task to handle incoming messages
    let mut read_task = reader_loop(read, state.user.clone());

    loop {
        tokio::select! {
            _ = &mut read_task => {
                return Err(ClientError::ConnectionError("Connection lost".to_string()));
            }
            line = input.recv() => {
                let Some(line) = line else {
                    // Input closed (Ctrl+C / Ctrl+D)
                    read_task.abort();
                    write.close().await.ok();
                    return Ok(());
                };

                let command = match parse_command(&line) {
                    Ok(command) => command,
                    Err(e) => {
                        print!("{}", MessageFormatter::format_error(&e.to_string()));
                        redisplay_prompt(&state.user);
                        continue;
                    }
                };

                let event = match state.event_for(&command) {
                    Ok(Some(event)) => event,
                    Ok(None) => {
                        read_task.abort();
                        write.close().await.ok();
                        return Ok(());
                    }
                    Err(e) => {
                        print!("{}", MessageFormatter::format_error(&e.to_string()));
                        redisplay_prompt(&state.user);
                        continue;
                    }
                };

                if let Err(e) = send_event(&mut write, &event).await {
                    read_task.abort();
                    return Err(e);
                }
                state.apply(&command);

                if matches!(command, Command::Chat(_)) {
                    print!("{}", MessageFormatter::format_sent_confirmation(now_millis()));
                }
                redisplay_prompt(&state.user);
            }
        }
    }
}

async fn send_event(
    write: &mut SplitSink<WsStream, Message>,
    event: &InboundEventDto,
) -> Result<(), ClientError> {
    let json = serde_json::to_string(event)?;
    write.send(Message::Text(json.into())).await.map_err(|e| {
        tracing::warn!("Failed to send event: {}", e);
        ClientError::ConnectionError(e.to_string())
    })
}

/// Spawns a task that prints every frame received from the server.
///
/// The task ends when the server closes the connection or the stream fails.
fn reader_loop(mut read: SplitStream<WsStream>, user: String) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(message) = read.next().await {
            let formatted = match message {
                Ok(Message::Text(text)) => {
                    match serde_json::from_str::<ServerMessageDto>(text.as_str()) {
                        Ok(ServerMessageDto::Event(event)) => MessageFormatter::format_event(&event),
                        Ok(ServerMessageDto::Error(notice)) => {
                            MessageFormatter::format_error(&notice.reason)
                        }
                        Err(_) => MessageFormatter::format_raw_message(text.as_str()),
                    }
                }
                Ok(Message::Binary(data)) => MessageFormatter::format_binary_message(data.len()),
                Ok(Message::Close(_)) => {
                    tracing::info!("Server closed the connection");
                    break;
                }
                Err(e) => {
                    tracing::warn!("WebSocket read error: {}", e);
                    break;
                }
                Ok(_) => continue,
            };
            print!("{}", formatted);
            redisplay_prompt(&user);
        }
    })
}
