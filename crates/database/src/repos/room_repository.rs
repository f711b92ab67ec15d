//! Repository for chat room data access operations.

use crate::entities::{ChatRoom, Message};
use crate::repos::message_repository::now_rfc3339;
use crate::types::{MessagingError, MessagingResult, PairKey};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use tracing::info;

/// Repository for room database operations. Rooms are keyed by the
/// canonical pair; the UNIQUE constraint on `pair_key` enforces the
/// one-room-per-pair invariant even under concurrent creation.
#[derive(Clone)]
pub struct RoomRepository {
    pool: SqlitePool,
}

fn room_from_row(row: &SqliteRow) -> MessagingResult<ChatRoom> {
    Ok(ChatRoom {
        id: row.try_get("id")?,
        public_id: row.try_get("public_id")?,
        participant_low: row.try_get("participant_low")?,
        participant_high: row.try_get("participant_high")?,
        appointment_id: row.try_get("appointment_id")?,
        last_message: row.try_get("last_message")?,
        last_message_at: row.try_get("last_message_at")?,
        is_active: row.try_get("is_active")?,
        created_at: row.try_get("created_at")?,
    })
}

const ROOM_COLUMNS: &str = "id, public_id, participant_low, participant_high, appointment_id, \
                            last_message, last_message_at, is_active, created_at";

impl RoomRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Find the room for a pair, if one exists.
    pub async fn find_by_pair(&self, pair: &PairKey) -> MessagingResult<Option<ChatRoom>> {
        let row = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms WHERE pair_key = ?"
        ))
        .bind(pair.storage_key())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(room_from_row).transpose()
    }

    /// Return the existing room for the pair, or create one. Safe to call
    /// concurrently from both participants: `INSERT OR IGNORE` against the
    /// unique pair key means at most one insert wins and everyone reads
    /// back the same row. An existing room is returned untouched, so the
    /// appointment annotation sticks to whoever created the room first.
    pub async fn get_or_create(
        &self,
        pair: &PairKey,
        appointment_id: Option<&str>,
    ) -> MessagingResult<ChatRoom> {
        if let Some(room) = self.find_by_pair(pair).await? {
            return Ok(room);
        }

        let public_id = cuid2::cuid();
        let now = now_rfc3339();

        let result = sqlx::query(
            "INSERT OR IGNORE INTO rooms (public_id, pair_key, participant_low, participant_high, appointment_id, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(&public_id)
        .bind(pair.storage_key())
        .bind(pair.low())
        .bind(pair.high())
        .bind(appointment_id)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            info!(
                public_id = %public_id,
                pair = %pair,
                "created chat room"
            );
        }

        // Either our insert landed or a concurrent one did; the read-back
        // is the single source of the room identity.
        self.find_by_pair(pair).await?.ok_or_else(|| {
            MessagingError::StorageUnavailable(format!("room for {pair} vanished after upsert"))
        })
    }

    /// All rooms involving `user_id`. Rooms that have messages come first,
    /// newest activity on top; rooms with no messages yet follow, newest
    /// creation on top.
    pub async fn list_for_user(&self, user_id: &str) -> MessagingResult<Vec<ChatRoom>> {
        let rows = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM rooms
             WHERE participant_low = ? OR participant_high = ?
             ORDER BY (last_message_at IS NULL) ASC,
                      COALESCE(last_message_at, created_at) DESC,
                      id DESC"
        ))
        .bind(user_id)
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(room_from_row).collect()
    }

    /// Refresh the cached last-message projection after an accepted send.
    /// Guarded on the message rowid, so a delayed update for an older
    /// message can never overwrite a newer one.
    pub async fn record_activity(&self, pair: &PairKey, message: &Message) -> MessagingResult<()> {
        sqlx::query(
            "UPDATE rooms SET last_message = ?, last_message_at = ?, last_message_seq = ?
             WHERE pair_key = ? AND last_message_seq < ?",
        )
        .bind(&message.content)
        .bind(&message.created_at)
        .bind(message.id)
        .bind(pair.storage_key())
        .bind(message.id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
