//! Domain logic for client-side operations.
//!
//! Pure functions over the input line and the client's state, kept free of
//! I/O so they are easy to test.

use parlor_server::infrastructure::dto::websocket::{EventKindDto, InboundEventDto};

use crate::error::ClientError;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Plain text, sent as a chat message to the current room
    Chat(String),
    /// `/join <room>`
    Join(String),
    /// `/leave`
    Leave,
    /// `/typing`
    Typing,
    /// `/stop`
    StopTyping,
    /// `/quit`
    Quit,
}

/// Parse a trimmed, non-empty input line.
///
/// Lines starting with `/` are commands; anything else is chat text.
pub fn parse_command(line: &str) -> Result<Command, ClientError> {
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Command::Chat(line.to_string()));
    };

    let mut parts = command.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let argument = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

    match (name, argument) {
        ("join", Some(room)) => Ok(Command::Join(room.to_string())),
        ("join", None) => Err(ClientError::InvalidCommand(
            "usage: /join <room>".to_string(),
        )),
        ("leave", _) => Ok(Command::Leave),
        ("typing", _) => Ok(Command::Typing),
        ("stop", _) => Ok(Command::StopTyping),
        ("quit", _) => Ok(Command::Quit),
        (other, _) => Err(ClientError::InvalidCommand(format!(
            "unknown command '/{}'",
            other
        ))),
    }
}

/// What the client remembers across reconnects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientState {
    pub user: String,
    /// Room joined last; rejoined after a reconnect
    pub room: Option<String>,
}

impl ClientState {
    pub fn new(user: String, room: Option<String>) -> Self {
        Self { user, room }
    }

    /// The `join` event that restores membership after (re)connecting
    pub fn rejoin_event(&self) -> Option<InboundEventDto> {
        self.room
            .as_ref()
            .map(|room| self.event(EventKindDto::Join, Some(room.clone()), None))
    }

    /// Build the wire event for `command` against the current state.
    ///
    /// Returns `Ok(None)` for `Quit`.
    pub fn event_for(&self, command: &Command) -> Result<Option<InboundEventDto>, ClientError> {
        let event = match command {
            Command::Chat(text) => {
                self.event(EventKindDto::Chat, self.room.clone(), Some(text.clone()))
            }
            Command::Join(room) => self.event(EventKindDto::Join, Some(room.clone()), None),
            Command::Leave => {
                let room = self
                    .room
                    .clone()
                    .ok_or_else(|| ClientError::InvalidCommand("not in a room".to_string()))?;
                self.event(EventKindDto::Leave, Some(room), None)
            }
            Command::Typing => self.event(EventKindDto::Typing, self.room.clone(), None),
            Command::StopTyping => self.event(EventKindDto::StopTyping, self.room.clone(), None),
            Command::Quit => return Ok(None),
        };
        Ok(Some(event))
    }

    /// Update the current room after `command` was sent
    pub fn apply(&mut self, command: &Command) {
        match command {
            Command::Join(room) => self.room = Some(room.clone()),
            Command::Leave => self.room = None,
            _ => {}
        }
    }

    fn event(
        &self,
        kind: EventKindDto,
        room: Option<String>,
        payload: Option<String>,
    ) -> InboundEventDto {
        InboundEventDto {
            kind,
            room,
            user: Some(self.user.clone()),
            payload,
        }
    }
}

/// Check if the client should exit immediately based on the error type.
///
/// # Returns
///
/// `true` if retrying cannot help (e.g. an unusable URL), `false` otherwise
pub fn should_exit_immediately(error: &ClientError) -> bool {
    matches!(error, ClientError::InvalidUrl(_))
}

/// Check if the client should attempt to reconnect.
///
/// # Arguments
///
/// * `error` - The client error that occurred
/// * `current_attempt` - The current reconnection attempt count (0-indexed)
/// * `max_attempts` - The maximum number of reconnection attempts allowed
pub fn should_attempt_reconnect(
    error: &ClientError,
    current_attempt: u32,
    max_attempts: u32,
) -> bool {
    // Don't reconnect if the error requires immediate exit
    if should_exit_immediately(error) {
        return false;
    }

    // Don't reconnect if we've exhausted all attempts
    current_attempt < max_attempts
}
