//! Message formatting utilities for client display.

use parlor_server::infrastructure::dto::websocket::{EventKindDto, OutboundEventDto};
use parlor_shared::time::{rfc3339_to_local_time, timestamp_to_rfc3339};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format the banner printed after connecting
    pub fn format_welcome(user: &str, room: Option<&str>) -> String {
        let mut output = String::new();
        output.push_str("\n============================================================\n");
        output.push_str(&format!("You are '{}'.\n", user));
        match room {
            Some(room) => output.push_str(&format!("Joining #{}\n", room)),
            None => output.push_str("Not in a room yet. Use /join <room>.\n"),
        }
        output.push_str("Commands: /join <room>, /leave, /typing, /stop, /quit\n");
        output.push_str("============================================================\n");
        output
    }

    /// Format an event fanned out by the server
    ///
    /// # Arguments
    ///
    /// * `event` - The event as received on the wire
    ///
    /// # Returns
    ///
    /// A formatted string, with the timestamp rendered in local time
    pub fn format_event(event: &OutboundEventDto) -> String {
        let time = Self::local_time(&event.timestamp);
        match event.kind {
            EventKindDto::Join => format!("\n+ {} joined #{} at {}\n", event.user, event.room, time),
            EventKindDto::Leave => format!("\n- {} left #{} at {}\n", event.user, event.room, time),
            EventKindDto::Chat => format!(
                "\n\n------------------------------------------------------------\n\
                 #{} @{}: {}\n\
                 sent at {}\n\
                 ------------------------------------------------------------\n",
                event.room,
                event.user,
                event.payload.as_deref().unwrap_or_default(),
                time
            ),
            EventKindDto::Typing => format!("\n... {} is typing in #{}\n", event.user, event.room),
            EventKindDto::StopTyping => {
                format!("\n... {} stopped typing in #{}\n", event.user, event.room)
            }
        }
    }

    /// Format an error notice from the server
    pub fn format_error(reason: &str) -> String {
        format!("\n! {}\n", reason)
    }

    /// Format a confirmation message after sending
    ///
    /// # Arguments
    ///
    /// * `sent_at` - Unix timestamp when the message was sent (milliseconds)
    pub fn format_sent_confirmation(sent_at: i64) -> String {
        format!("sent at {}\n", Self::local_time(&timestamp_to_rfc3339(sent_at)))
    }

    /// Format a binary message notification
    pub fn format_binary_message(byte_count: usize) -> String {
        format!("\n← Received {} bytes of binary data\n", byte_count)
    }

    /// Format a raw text message (when parsing fails)
    pub fn format_raw_message(text: &str) -> String {
        format!("\n← Received: {}\n", text)
    }

    fn local_time(rfc3339: &str) -> String {
        rfc3339_to_local_time(rfc3339).unwrap_or_else(|| rfc3339.to_string())
    }
}
