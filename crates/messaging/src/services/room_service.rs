//! Room service: idempotent room lookup and per-user listing.

use parley_database::{ChatRoom, MessagingResult, PairKey, RoomRepository};
use sqlx::SqlitePool;

/// Service for chat room operations. Rooms are a derived index over the
/// message log; this service never mutates messages.
pub struct RoomService {
    rooms: RoomRepository,
}

impl RoomService {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            rooms: RoomRepository::new(pool),
        }
    }

    /// The room for an unordered pair, created lazily on first request.
    /// Requesting an existing room returns it unchanged, in either
    /// participant order.
    pub async fn get_or_create_room(
        &self,
        user_a: &str,
        user_b: &str,
        appointment_id: Option<&str>,
    ) -> MessagingResult<ChatRoom> {
        let pair = PairKey::new(user_a, user_b)?;
        self.rooms.get_or_create(&pair, appointment_id).await
    }

    /// All rooms the user participates in: rooms with messages first by
    /// latest activity, then message-less rooms by creation time.
    pub async fn list_rooms_for_user(&self, user_id: &str) -> MessagingResult<Vec<ChatRoom>> {
        self.rooms.list_for_user(user_id).await
    }
}
