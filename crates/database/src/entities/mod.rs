//! Domain entities for the messaging store.

pub mod message;
pub mod room;

pub use message::{Message, MessageType, SendMessageRequest};
pub use room::ChatRoom;
