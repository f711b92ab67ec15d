//! Repository implementations over the SQLite store.

pub mod message_repository;
pub mod room_repository;

pub use message_repository::{MessageRepository, DEFAULT_CONVERSATION_LIMIT};
pub use room_repository::RoomRepository;
