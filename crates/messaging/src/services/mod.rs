//! Business-logic layer over the repositories.

pub mod message_service;
pub mod read_service;
pub mod room_service;

pub use message_service::MessageService;
pub use read_service::ReadService;
pub use room_service::RoomService;
