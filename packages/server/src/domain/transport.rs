//! Transport trait
//!
//! The domain pushes `ServerMessage`s through this interface without knowing
//! how they are framed or delivered. Encoding happens inside the
//! implementation (see `infrastructure::transport`).
//!
//! `push` must not block on network I/O: implementations enqueue the message
//! and return, so a slow recipient never delays a fan-out to the others.

use super::{entity::ServerMessage, error::TransportError};

#[cfg_attr(test, mockall::automock)]
pub trait Transport: Send + Sync {
    /// Enqueue a message for delivery to this connection's peer
    fn push(&self, message: &ServerMessage) -> Result<(), TransportError>;
}
