//! Message entity definitions

use serde::{Deserialize, Serialize};

/// A single direct message. Immutable after creation except for the
/// `is_read` flag, which only ever flips false -> true.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Rowid; assignment order, the authoritative tie-break for equal timestamps.
    pub id: i64,
    /// Externally visible message identifier.
    pub public_id: String,
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    pub message_type: MessageType,
    /// Opaque annotation pointing at an external appointment; never validated here.
    pub appointment_id: Option<String>,
    pub is_read: bool,
    /// RFC 3339 UTC, assigned when the send is accepted.
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct SendMessageRequest {
    pub sender_id: String,
    pub recipient_id: String,
    pub content: String,
    pub message_type: MessageType,
    pub appointment_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "TEXT", rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    File,
}

impl MessageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MessageType::Text => "text",
            MessageType::Image => "image",
            MessageType::File => "file",
        }
    }
}

impl From<&str> for MessageType {
    fn from(s: &str) -> Self {
        match s {
            "image" => MessageType::Image,
            "file" => MessageType::File,
            _ => MessageType::Text,
        }
    }
}

impl ToString for MessageType {
    fn to_string(&self) -> String {
        self.as_str().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_type_round_trips_through_text_coding() {
        for ty in [MessageType::Text, MessageType::Image, MessageType::File] {
            assert_eq!(MessageType::from(ty.as_str()), ty);
        }
    }

    #[test]
    fn unknown_message_type_falls_back_to_text() {
        assert_eq!(MessageType::from("sticker"), MessageType::Text);
    }
}
