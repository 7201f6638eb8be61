//! Parlor chat server library.
//!
//! Room-scoped real-time chat over WebSocket: a connection registry, a room
//! membership table, and a router that fans chat and presence events out to
//! the other members of a room.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub mod config;
