//! Message service: validation, append, projection update, notification.

use std::sync::Arc;

use crate::hub::NotificationHub;
use parley_database::{
    Message, MessageRepository, MessageType, MessagingError, MessagingResult, PairKey,
    RoomRepository, SendMessageRequest, DEFAULT_CONVERSATION_LIMIT,
};
use sqlx::SqlitePool;
use tracing::warn;

/// Service for sending and reading messages. The message log is the
/// single source of truth; the room projection and notifications are
/// derived from it on every accepted send.
pub struct MessageService {
    messages: MessageRepository,
    rooms: RoomRepository,
    hub: Arc<NotificationHub>,
}

impl MessageService {
    pub fn new(pool: SqlitePool, hub: Arc<NotificationHub>) -> Self {
        Self {
            messages: MessageRepository::new(pool.clone()),
            rooms: RoomRepository::new(pool),
            hub,
        }
    }

    /// Accept and persist a message. Ensures the pair's room exists,
    /// appends to the log, refreshes the room projection, and notifies
    /// subscribers. The returned message carries the server-assigned id
    /// and timestamp.
    pub async fn send(
        &self,
        sender_id: &str,
        recipient_id: &str,
        content: &str,
        message_type: MessageType,
        appointment_id: Option<&str>,
    ) -> MessagingResult<Message> {
        let pair = PairKey::new(sender_id, recipient_id)?;

        if message_type == MessageType::Text && content.trim().is_empty() {
            return Err(MessagingError::EmptyContent);
        }

        self.rooms.get_or_create(&pair, appointment_id).await?;

        let message = self
            .messages
            .insert(
                &pair,
                &SendMessageRequest {
                    sender_id: sender_id.to_string(),
                    recipient_id: recipient_id.to_string(),
                    content: content.to_string(),
                    message_type,
                    appointment_id: appointment_id.map(str::to_string),
                },
            )
            .await?;

        self.rooms.record_activity(&pair, &message).await?;

        // The send is durable at this point; a delivery hiccup is logged
        // and left to the next notification or poll cycle.
        if let Err(error) = self.hub.notify(&pair).await {
            warn!(%pair, %error, "failed to notify subscribers after send");
        }

        Ok(message)
    }

    /// The conversation between two users, ascending by timestamp with
    /// insertion order breaking ties, truncated to the most recent
    /// `limit` messages (50 when unspecified). Symmetric in its
    /// arguments; an unknown pair yields an empty list.
    pub async fn get_conversation(
        &self,
        user_a: &str,
        user_b: &str,
        limit: Option<i64>,
    ) -> MessagingResult<Vec<Message>> {
        let pair = PairKey::new(user_a, user_b)?;
        self.messages
            .find_conversation(&pair, limit.unwrap_or(DEFAULT_CONVERSATION_LIMIT))
            .await
    }
}
