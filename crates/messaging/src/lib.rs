//! # Parley Messaging Crate
//!
//! The direct-messaging core: ordered message storage, one deduplicated
//! room per unordered participant pair, per-recipient read state, and a
//! subscribe/notify hub delivering full conversation snapshots.
//!
//! ## Architecture
//!
//! - **Services**: business logic over the `parley-database` repositories
//! - **Hub**: observer registry with synchronous notify-on-send plus a
//!   polling fallback
//! - **[`Messenger`]**: the facade tying everything together
//!
//! ## Usage
//!
//! ```no_run
//! # async fn demo(pool: sqlx::SqlitePool) -> parley_database::MessagingResult<()> {
//! use parley_config::HubConfig;
//! use parley_database::MessageType;
//! use parley_messaging::Messenger;
//!
//! let messenger = Messenger::new(pool, &HubConfig::default());
//! let message = messenger
//!     .send("alice", "bob", "hello", MessageType::Text, None)
//!     .await?;
//! assert!(!message.public_id.is_empty());
//! # Ok(())
//! # }
//! ```

pub mod hub;
pub mod services;

pub use hub::{ConversationSnapshot, NotificationHub, SnapshotCallback, SubscriptionHandle};
pub use services::{MessageService, ReadService, RoomService};

use std::sync::Arc;
use std::time::Duration;

use parley_config::HubConfig;
use parley_database::{
    ChatRoom, Message, MessageRepository, MessageType, MessagingResult, PairKey,
};
use sqlx::SqlitePool;

/// Facade over the messaging core. One instance per process; cheap to
/// share behind an `Arc`.
pub struct Messenger {
    messages: MessageService,
    rooms: RoomService,
    reads: ReadService,
    hub: Arc<NotificationHub>,
    poll_interval: Duration,
}

impl Messenger {
    pub fn new(pool: SqlitePool, hub_config: &HubConfig) -> Self {
        let hub = Arc::new(NotificationHub::new(
            MessageRepository::new(pool.clone()),
            hub_config.snapshot_limit,
        ));

        Self {
            messages: MessageService::new(pool.clone(), hub.clone()),
            rooms: RoomService::new(pool.clone()),
            reads: ReadService::new(pool),
            hub,
            poll_interval: Duration::from_secs(hub_config.poll_interval_seconds),
        }
    }

    /// Send a message; the returned entity's `public_id` is the message id.
    pub async fn send(
        &self,
        sender_id: &str,
        recipient_id: &str,
        content: &str,
        message_type: MessageType,
        appointment_id: Option<&str>,
    ) -> MessagingResult<Message> {
        self.messages
            .send(sender_id, recipient_id, content, message_type, appointment_id)
            .await
    }

    /// Ordered conversation between two users, in either argument order.
    pub async fn get_conversation(
        &self,
        user_a: &str,
        user_b: &str,
        limit: Option<i64>,
    ) -> MessagingResult<Vec<Message>> {
        self.messages.get_conversation(user_a, user_b, limit).await
    }

    /// Subscribe to a conversation; the callback receives the current
    /// snapshot immediately and a fresh one after every accepted send.
    pub async fn subscribe(
        &self,
        user_a: &str,
        user_b: &str,
        callback: impl Fn(ConversationSnapshot) + Send + Sync + 'static,
    ) -> MessagingResult<SubscriptionHandle> {
        let pair = PairKey::new(user_a, user_b)?;
        self.hub.subscribe(pair, callback).await
    }

    pub async fn get_or_create_room(
        &self,
        user_a: &str,
        user_b: &str,
        appointment_id: Option<&str>,
    ) -> MessagingResult<ChatRoom> {
        self.rooms
            .get_or_create_room(user_a, user_b, appointment_id)
            .await
    }

    pub async fn list_rooms_for_user(&self, user_id: &str) -> MessagingResult<Vec<ChatRoom>> {
        self.rooms.list_rooms_for_user(user_id).await
    }

    pub async fn mark_read(&self, reader_id: &str, other_party_id: &str) -> MessagingResult<u64> {
        self.reads.mark_read(reader_id, other_party_id).await
    }

    pub async fn unread_total(&self, user_id: &str) -> MessagingResult<i64> {
        self.reads.unread_total(user_id).await
    }

    pub async fn unread_for_conversation(
        &self,
        user_id: &str,
        other_party_id: &str,
    ) -> MessagingResult<i64> {
        self.reads
            .unread_for_conversation(user_id, other_party_id)
            .await
    }

    /// Start the polling fallback so subscribers also see writes made by
    /// other processes sharing the database.
    pub fn start_polling(&self) -> tokio::task::JoinHandle<()> {
        self.hub.spawn_poller(self.poll_interval)
    }
}
