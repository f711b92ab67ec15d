//! Repository for the append-only message log.

use crate::entities::{Message, MessageType, SendMessageRequest};
use crate::types::{MessagingResult, PairKey};
use chrono::SecondsFormat;
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Default window when a caller does not specify a conversation limit.
pub const DEFAULT_CONVERSATION_LIMIT: i64 = 50;

/// Repository for message database operations. Messages are append-only;
/// the only mutation is the monotonic read flag.
#[derive(Clone)]
pub struct MessageRepository {
    pool: SqlitePool,
}

fn message_from_row(row: &SqliteRow) -> MessagingResult<Message> {
    let message_type: String = row.try_get("message_type")?;
    Ok(Message {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        sender_id: row.try_get("sender_id")?,
        recipient_id: row.try_get("recipient_id")?,
        content: row.try_get("content")?,
        message_type: MessageType::from(message_type.as_str()),
        appointment_id: row.try_get("appointment_id")?,
        is_read: row.try_get("is_read")?,
        created_at: row.try_get("created_at")?,
    })
}

/// Timestamps are fixed-width RFC 3339 so lexicographic comparison in
/// SQL matches chronological order.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true)
}

impl MessageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Append a message. The timestamp is assigned here, at the moment
    /// the send is accepted, which defines the order for concurrent senders.
    pub async fn insert(&self, pair: &PairKey, request: &SendMessageRequest) -> MessagingResult<Message> {
        let public_id = cuid2::cuid();
        let now = now_rfc3339();

        let result = sqlx::query(
            "INSERT INTO messages (public_id, pair_key, sender_id, recipient_id, content, message_type, appointment_id, is_read, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&public_id)
        .bind(pair.storage_key())
        .bind(&request.sender_id)
        .bind(&request.recipient_id)
        .bind(&request.content)
        .bind(request.message_type.as_str())
        .bind(&request.appointment_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        let message_id = result.last_insert_rowid();

        info!(
            message_id = message_id,
            public_id = %public_id,
            sender_id = %request.sender_id,
            recipient_id = %request.recipient_id,
            "stored new message"
        );

        Ok(Message {
            id: message_id,
            public_id,
            sender_id: request.sender_id.clone(),
            recipient_id: request.recipient_id.clone(),
            content: request.content.clone(),
            message_type: request.message_type,
            appointment_id: request.appointment_id.clone(),
            is_read: false,
            created_at: now,
        })
    }

    /// The most recent `limit` messages for a pair, in ascending
    /// `(created_at, id)` order. An unknown pair yields an empty list.
    pub async fn find_conversation(&self, pair: &PairKey, limit: i64) -> MessagingResult<Vec<Message>> {
        let rows = sqlx::query(
            "SELECT id, public_id, sender_id, recipient_id, content, message_type, appointment_id, is_read, created_at
             FROM messages WHERE pair_key = ? ORDER BY created_at DESC, id DESC LIMIT ?",
        )
        .bind(pair.storage_key())
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut messages = rows
            .iter()
            .map(message_from_row)
            .collect::<MessagingResult<Vec<_>>>()?;
        messages.reverse();

        Ok(messages)
    }

    /// The newest message between the pair, if any.
    pub async fn last_for_pair(&self, pair: &PairKey) -> MessagingResult<Option<Message>> {
        let row = sqlx::query(
            "SELECT id, public_id, sender_id, recipient_id, content, message_type, appointment_id, is_read, created_at
             FROM messages WHERE pair_key = ? ORDER BY created_at DESC, id DESC LIMIT 1",
        )
        .bind(pair.storage_key())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(message_from_row).transpose()
    }

    /// Flip every unread message from `other_party_id` to `reader_id` to
    /// read. Idempotent; returns the number of rows that changed.
    pub async fn mark_read(&self, reader_id: &str, other_party_id: &str) -> MessagingResult<u64> {
        let result = sqlx::query(
            "UPDATE messages SET is_read = 1
             WHERE recipient_id = ? AND sender_id = ? AND is_read = 0",
        )
        .bind(reader_id)
        .bind(other_party_id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Unread messages addressed to `user_id` across all conversations.
    pub async fn unread_total(&self, user_id: &str) -> MessagingResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Unread messages addressed to `user_id` from one counterpart.
    pub async fn unread_for_conversation(
        &self,
        user_id: &str,
        other_party_id: &str,
    ) -> MessagingResult<i64> {
        let count = sqlx::query_scalar(
            "SELECT COUNT(*) FROM messages WHERE recipient_id = ? AND sender_id = ? AND is_read = 0",
        )
        .bind(user_id)
        .bind(other_party_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
