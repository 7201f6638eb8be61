//! Repository 実装
//!
//! - `inmemory`: DashMap を使ったメンバーシップテーブル

pub mod inmemory;

pub use inmemory::InMemoryRoomRepository;
