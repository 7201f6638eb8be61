//! Server configuration.

use crate::domain::{RoomId, ValueObjectError};

pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 8080;

/// Runtime settings for `Server::run`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Room used when an event names none and the sender has no current room
    pub default_room: Option<RoomId>,
}

impl ServerConfig {
    /// Build a config, validating the default room name if one is given
    pub fn new(
        host: String,
        port: u16,
        default_room: Option<String>,
    ) -> Result<Self, ValueObjectError> {
        let default_room = default_room.map(RoomId::new).transpose()?;
        Ok(Self {
            host,
            port,
            default_room,
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            default_room: None,
        }
    }
}
