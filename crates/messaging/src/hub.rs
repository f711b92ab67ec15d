//! Notification hub: delivers conversation snapshots to subscribers.
//!
//! The hub keeps an explicit observer registry keyed by the normalized
//! participant pair. Every accepted send triggers a synchronous
//! notification; an optional polling loop re-scans subscribed pairs so
//! writers outside this process are eventually reflected as well.

use std::collections::HashMap;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use parley_database::{Message, MessageRepository, MessagingResult, PairKey};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Callback invoked with a full conversation snapshot on every delivery.
pub type SnapshotCallback = Arc<dyn Fn(ConversationSnapshot) + Send + Sync>;

/// The full ordered message list for one conversation at a point in time.
/// Deliveries are whole snapshots, never diffs.
#[derive(Debug, Clone)]
pub struct ConversationSnapshot {
    pub pair: PairKey,
    pub messages: Vec<Message>,
}

impl ConversationSnapshot {
    /// Sequence number of the newest message, 0 for an empty conversation.
    /// Monotonic freshness checks compare these.
    pub fn latest_seq(&self) -> i64 {
        self.messages.last().map(|m| m.id).unwrap_or(0)
    }
}

struct Subscriber {
    id: u64,
    callback: SnapshotCallback,
    cancelled: AtomicBool,
    // Last delivered sequence. The lock is held across both the
    // freshness check and the callback call, so deliveries to one
    // subscriber are serialized and can never arrive out of order.
    // Starts below any real sequence so the initial snapshot of an empty
    // conversation (seq 0) is still delivered exactly once.
    last_delivered_seq: Mutex<i64>,
}

/// Handle returned from `subscribe`. Dropping it does NOT cancel; call
/// [`SubscriptionHandle::cancel`].
pub struct SubscriptionHandle {
    subscriber: Arc<Subscriber>,
}

impl SubscriptionHandle {
    /// Stop all further deliveries. Idempotent, and safe to call from
    /// inside the subscription callback: it only flips an atomic flag,
    /// the registry entry is pruned on the next dispatch for the pair.
    pub fn cancel(&self) {
        self.subscriber.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.subscriber.cancelled.load(Ordering::Acquire)
    }
}

/// Observer registry plus snapshot dispatch.
pub struct NotificationHub {
    messages: MessageRepository,
    snapshot_limit: i64,
    subscribers: RwLock<HashMap<PairKey, Vec<Arc<Subscriber>>>>,
    next_subscriber_id: AtomicU64,
}

impl NotificationHub {
    pub fn new(messages: MessageRepository, snapshot_limit: i64) -> Self {
        Self {
            messages,
            snapshot_limit,
            subscribers: RwLock::new(HashMap::new()),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Register an observer for a pair and deliver the current snapshot
    /// to it once before returning.
    pub async fn subscribe(
        &self,
        pair: PairKey,
        callback: impl Fn(ConversationSnapshot) + Send + Sync + 'static,
    ) -> MessagingResult<SubscriptionHandle> {
        let subscriber = Arc::new(Subscriber {
            id: self.next_subscriber_id.fetch_add(1, Ordering::Relaxed),
            callback: Arc::new(callback),
            cancelled: AtomicBool::new(false),
            last_delivered_seq: Mutex::new(-1),
        });

        // Register before fetching the initial snapshot: a send accepted
        // in between then notifies this subscriber too, and the sequence
        // check in `deliver` drops whichever of the two snapshots is
        // older.
        {
            let mut map = self.subscribers.write().await;
            map.entry(pair.clone()).or_default().push(subscriber.clone());
        }

        let snapshot = match self.snapshot(&pair).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                subscriber.cancelled.store(true, Ordering::Release);
                return Err(error);
            }
        };

        debug!(subscriber_id = subscriber.id, %pair, "subscribed to conversation");
        Self::deliver(&subscriber, snapshot);

        Ok(SubscriptionHandle { subscriber })
    }

    /// Push a fresh snapshot of the pair's conversation to every live
    /// subscriber. Called synchronously after each accepted send and by
    /// the polling loop.
    pub async fn notify(&self, pair: &PairKey) -> MessagingResult<()> {
        let targets = self.live_subscribers(pair).await;
        if targets.is_empty() {
            return Ok(());
        }

        let snapshot = self.snapshot(pair).await?;
        for subscriber in &targets {
            Self::deliver(subscriber, snapshot.clone());
        }

        Ok(())
    }

    /// Pairs that currently have at least one subscriber.
    pub async fn subscribed_pairs(&self) -> Vec<PairKey> {
        self.subscribers.read().await.keys().cloned().collect()
    }

    /// Periodically re-deliver snapshots for all subscribed pairs. The
    /// per-subscriber sequence check keeps unchanged conversations from
    /// producing duplicate deliveries; a storage failure only skips the
    /// cycle, it never terminates subscriptions.
    pub fn spawn_poller(self: &Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        let hub = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                for pair in hub.subscribed_pairs().await {
                    if let Err(error) = hub.notify(&pair).await {
                        warn!(%pair, %error, "storage unavailable, skipping poll cycle");
                    }
                }
            }
        })
    }

    async fn snapshot(&self, pair: &PairKey) -> MessagingResult<ConversationSnapshot> {
        let messages = self
            .messages
            .find_conversation(pair, self.snapshot_limit)
            .await?;
        Ok(ConversationSnapshot {
            pair: pair.clone(),
            messages,
        })
    }

    /// Snapshot the subscriber list for a pair, pruning cancelled entries.
    /// The lock is released before any callback runs.
    async fn live_subscribers(&self, pair: &PairKey) -> Vec<Arc<Subscriber>> {
        let mut map = self.subscribers.write().await;
        let Some(entries) = map.get_mut(pair) else {
            return Vec::new();
        };

        entries.retain(|s| !s.cancelled.load(Ordering::Acquire));
        if entries.is_empty() {
            map.remove(pair);
            return Vec::new();
        }
        entries.clone()
    }

    fn deliver(subscriber: &Arc<Subscriber>, snapshot: ConversationSnapshot) {
        let seq = snapshot.latest_seq();
        // The lock spans the freshness check and the callback, so two
        // racing deliveries to the same subscriber cannot invoke the
        // callback out of order. A stale snapshot (or an unchanged poll
        // cycle) is dropped here.
        let mut last_seq = subscriber
            .last_delivered_seq
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if *last_seq >= seq {
            return;
        }
        if subscriber.cancelled.load(Ordering::Acquire) {
            return;
        }
        *last_seq = seq;

        let callback = subscriber.callback.clone();
        if catch_unwind(AssertUnwindSafe(|| (callback)(snapshot))).is_err() {
            warn!(
                subscriber_id = subscriber.id,
                "subscription callback panicked, continuing dispatch"
            );
        }
    }
}
