//! UI utilities for the client.

use std::io::Write;

/// Prompt shown by the line editor
pub fn prompt(user: &str) -> String {
    format!("{}> ", user)
}

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(user: &str) {
    print!("{}", prompt(user));
    std::io::stdout().flush().ok();
}
