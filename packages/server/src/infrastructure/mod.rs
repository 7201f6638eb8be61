//! Infrastructure layer: concrete stores, wire DTOs and the WebSocket transport.

pub mod dto;
pub mod registry;
pub mod repository;
pub mod transport;
