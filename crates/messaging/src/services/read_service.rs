//! Read-state service: read-flag mutation and unread aggregates.

use parley_database::{MessageRepository, MessagingResult, PairKey};
use sqlx::SqlitePool;
use tracing::debug;

/// Service for per-recipient read state. All counts are aggregate
/// queries over the message log, so they can never drift from the
/// stored read flags.
pub struct ReadService {
    messages: MessageRepository,
}

impl ReadService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            messages: MessageRepository::new(pool),
        }
    }

    /// Mark every unread message from `other_party_id` to `reader_id` as
    /// read. Idempotent; returns the number of messages that changed.
    pub async fn mark_read(&self, reader_id: &str, other_party_id: &str) -> MessagingResult<u64> {
        // Same participant rules as send: distinct, non-empty identities.
        PairKey::new(reader_id, other_party_id)?;

        let changed = self.messages.mark_read(reader_id, other_party_id).await?;
        if changed > 0 {
            debug!(reader_id, other_party_id, changed, "marked conversation read");
        }
        Ok(changed)
    }

    /// Unread messages addressed to `user_id` across all conversations.
    pub async fn unread_total(&self, user_id: &str) -> MessagingResult<i64> {
        self.messages.unread_total(user_id).await
    }

    /// Unread messages addressed to `user_id` from a single counterpart.
    pub async fn unread_for_conversation(
        &self,
        user_id: &str,
        other_party_id: &str,
    ) -> MessagingResult<i64> {
        PairKey::new(user_id, other_party_id)?;
        self.messages
            .unread_for_conversation(user_id, other_party_id)
            .await
    }
}
