//! Server execution logic.

use std::{future::Future, sync::Arc};

use axum::{Router, routing::get};
use parlor_shared::time::Clock;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{
    config::ServerConfig,
    infrastructure::{registry::ConnectionRegistry, repository::InMemoryRoomRepository},
    usecase::{
        Broadcaster, ConnectParticipantUseCase, DisconnectParticipantUseCase,
        GetRoomDetailUseCase, GetRoomsUseCase, MessageRouter, PresenceNotifier,
    },
};

use super::{
    handler::{get_room_detail, get_rooms, health_check, websocket_handler},
    signal::shutdown_signal,
    state::AppState,
};

/// WebSocket chat server
///
/// Owns the connection registry and the room table and wires the use cases
/// around them. Every `Server` is independent, so several can run in one
/// process (the integration tests rely on this).
///
/// # Example
///
/// ```ignore
/// let config = ServerConfig::default();
/// let server = Server::new(&config, Arc::new(SystemClock));
/// server.run().await?;
/// ```
pub struct Server {
    config: ServerConfig,
    state: Arc<AppState>,
}

impl Server {
    /// Create a new Server instance
    ///
    /// # Arguments
    ///
    /// * `config` - Bind address and default room
    /// * `clock` - Time source for event timestamps and creation times
    pub fn new(config: &ServerConfig, clock: Arc<dyn Clock>) -> Self {
        // 1. Registry / Repository (in-memory)
        let registry = Arc::new(ConnectionRegistry::new(clock.clone()));
        let repository = Arc::new(InMemoryRoomRepository::new(clock.clone()));

        // 2. Fan-out
        let broadcaster = Arc::new(Broadcaster::new(
            registry.clone(),
            repository.clone(),
            clock,
        ));
        let notifier = Arc::new(PresenceNotifier::new(broadcaster.clone()));

        // 3. UseCases
        let connect_participant_usecase =
            Arc::new(ConnectParticipantUseCase::new(registry.clone()));
        let disconnect_participant_usecase = Arc::new(DisconnectParticipantUseCase::new(
            registry.clone(),
            repository.clone(),
            notifier.clone(),
        ));
        let message_router = Arc::new(MessageRouter::new(
            registry.clone(),
            repository.clone(),
            broadcaster,
            notifier,
            disconnect_participant_usecase.clone(),
            config.default_room.clone(),
        ));
        let get_rooms_usecase = Arc::new(GetRoomsUseCase::new(
            registry.clone(),
            repository.clone(),
        ));
        let get_room_detail_usecase =
            Arc::new(GetRoomDetailUseCase::new(registry, repository));

        let state = Arc::new(AppState {
            connect_participant_usecase,
            disconnect_participant_usecase,
            message_router,
            get_rooms_usecase,
            get_room_detail_usecase,
        });

        Self {
            config: config.clone(),
            state,
        }
    }

    /// Build the axum router with all endpoints
    pub fn router(&self) -> Router {
        Router::new()
            // WebSocket エンドポイント
            .route("/ws", get(websocket_handler))
            // HTTP エンドポイント
            .route("/api/health", get(health_check))
            .route("/api/rooms", get(get_rooms))
            .route("/api/rooms/{room_id}", get(get_room_detail))
            .layer(TraceLayer::new_for_http())
            .with_state(self.state.clone())
    }

    /// Run the WebSocket chat server until Ctrl+C / SIGTERM
    ///
    /// # Errors
    ///
    /// Returns an error if the server fails to bind to the configured address
    /// or if there's an error during server execution.
    pub async fn run(self) -> std::io::Result<()> {
        let bind_addr = self.config.bind_addr();
        let listener = TcpListener::bind(&bind_addr).await?;

        tracing::info!(
            "WebSocket chat server listening on {}",
            listener.local_addr()?
        );
        tracing::info!("Connect to: ws://{}/ws", bind_addr);
        if let Some(room) = &self.config.default_room {
            tracing::info!("Default room: '{}'", room);
        }
        tracing::info!("Press Ctrl+C to shutdown gracefully");

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    ///
    /// On shutdown every live connection is disconnected and removed from its
    /// rooms, which ends its session.
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> std::io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = self.router();
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown)
            .await?;

        let closed = self
            .state
            .disconnect_participant_usecase
            .disconnect_all()
            .await;
        tracing::info!("Server shutdown complete ({} connection(s) closed)", closed);

        Ok(())
    }
}
