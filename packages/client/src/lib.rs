//! Terminal client for the Parlor chat server.
//!
//! Reads lines from the terminal, turns them into chat / presence events and
//! prints what the other members of the room send.

pub mod domain;
pub mod error;
mod formatter;
mod runner;
mod session;
mod ui;

pub use error::ClientError;
pub use runner::run_client;
pub use session::run_client_session;
