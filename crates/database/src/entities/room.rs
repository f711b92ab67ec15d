//! Chat room entity definitions

use serde::{Deserialize, Serialize};

/// One conversation per unordered participant pair. Rooms are created
/// lazily and never deleted; `last_message`/`last_message_at` are a
/// cached projection of the message log, never authoritative.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRoom {
    pub id: i64,
    /// Externally visible room identifier, stable for the pair's lifetime.
    pub public_id: String,
    /// Lexicographically smaller participant.
    pub participant_low: String,
    /// Lexicographically larger participant.
    pub participant_high: String,
    /// Set once at creation when the room originates from an appointment.
    pub appointment_id: Option<String>,
    /// Content of the most recent message, if any.
    pub last_message: Option<String>,
    pub last_message_at: Option<String>,
    pub is_active: bool,
    pub created_at: String,
}

impl ChatRoom {
    /// The counterpart of `user_id` in this room, if the user is a participant.
    pub fn counterpart(&self, user_id: &str) -> Option<&str> {
        if self.participant_low == user_id {
            Some(&self.participant_high)
        } else if self.participant_high == user_id {
            Some(&self.participant_low)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_room() -> ChatRoom {
        ChatRoom {
            id: 1,
            public_id: "room-1".to_string(),
            participant_low: "alice".to_string(),
            participant_high: "bob".to_string(),
            appointment_id: None,
            last_message: None,
            last_message_at: None,
            is_active: true,
            created_at: "2026-01-01T00:00:00.000000+00:00".to_string(),
        }
    }

    #[test]
    fn counterpart_lookup() {
        let room = sample_room();
        assert_eq!(room.counterpart("alice"), Some("bob"));
        assert_eq!(room.counterpart("bob"), Some("alice"));
        assert_eq!(room.counterpart("carol"), None);
    }
}
