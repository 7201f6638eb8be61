//! Shared fixture for use case tests.

use std::sync::Arc;

use parlor_shared::time::FixedClock;
use tokio::sync::mpsc;

use crate::{
    domain::{
        ConnectionId, RoomId, ServerMessage, Transport, TransportError, transport::MockTransport,
    },
    infrastructure::{registry::ConnectionRegistry, repository::InMemoryRoomRepository},
};

use super::{
    Broadcaster, ConnectParticipantUseCase, DisconnectParticipantUseCase, MessageRouter,
    PresenceNotifier,
};

/// Fixed "now" used by every fixture clock
pub const NOW: i64 = 1_700_000_000_000;

/// Transport that hands delivered messages to a test channel
struct ChannelTransport(mpsc::UnboundedSender<ServerMessage>);

impl Transport for ChannelTransport {
    fn push(&self, message: &ServerMessage) -> Result<(), TransportError> {
        self.0
            .send(message.clone())
            .map_err(|_| TransportError::Closed)
    }
}

pub fn room(name: &str) -> RoomId {
    RoomId::new(name.to_string()).unwrap()
}

/// Drain everything currently queued on a test receiver
pub fn drain(rx: &mut mpsc::UnboundedReceiver<ServerMessage>) -> Vec<ServerMessage> {
    let mut messages = Vec::new();
    while let Ok(message) = rx.try_recv() {
        messages.push(message);
    }
    messages
}

pub struct Fixture {
    pub registry: Arc<ConnectionRegistry>,
    pub repository: Arc<InMemoryRoomRepository>,
    pub broadcaster: Arc<Broadcaster>,
    pub connect: ConnectParticipantUseCase,
    pub disconnect: Arc<DisconnectParticipantUseCase>,
    pub router: MessageRouter,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_default_room(None)
    }

    pub fn with_default_room(default_room: Option<RoomId>) -> Self {
        let clock = Arc::new(FixedClock::new(NOW));
        let registry = Arc::new(ConnectionRegistry::new(clock.clone()));
        let repository = Arc::new(InMemoryRoomRepository::new(clock.clone()));
        let broadcaster = Arc::new(Broadcaster::new(
            registry.clone(),
            repository.clone(),
            clock,
        ));
        let notifier = Arc::new(PresenceNotifier::new(broadcaster.clone()));
        let connect = ConnectParticipantUseCase::new(registry.clone());
        let disconnect = Arc::new(DisconnectParticipantUseCase::new(
            registry.clone(),
            repository.clone(),
            notifier.clone(),
        ));
        let router = MessageRouter::new(
            registry.clone(),
            repository.clone(),
            broadcaster.clone(),
            notifier,
            disconnect.clone(),
            default_room,
        );

        Self {
            registry,
            repository,
            broadcaster,
            connect,
            disconnect,
            router,
        }
    }

    /// Register a connection whose deliveries land on the returned receiver
    pub fn connect(&self) -> (ConnectionId, mpsc::UnboundedReceiver<ServerMessage>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = self.connect.execute(Arc::new(ChannelTransport(tx)));
        (id, rx)
    }

    /// Register a connection whose transport fails every push
    pub fn connect_failing(&self) -> ConnectionId {
        let mut transport = MockTransport::new();
        transport
            .expect_push()
            .returning(|_| Err(TransportError::Closed));
        self.connect.execute(Arc::new(transport))
    }
}
