//! Error types for the chat client.

use thiserror::Error;

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// The server URL cannot be used at all
    #[error("Invalid server URL '{0}'")]
    InvalidUrl(String),

    /// Connection error
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// A `/command` the client does not understand
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    #[error("Failed to encode event: {0}")]
    Encode(#[from] serde_json::Error),
}
