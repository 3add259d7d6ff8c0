//! In-memory notification feed store.
//!
//! One dashmap entry per recipient. The full feed, ordered by creation
//! time descending, is what subscribers receive on every change.

use async_trait::async_trait;
use dashmap::DashMap;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use tutorlink_core::result::AppResult;
use tutorlink_core::types::id::UserId;
use tutorlink_core::types::subscription::Subscription;
use tutorlink_entity::notification::NotificationEntry;

use crate::traits::NotificationStore;

/// One recipient's feed plus its change feed.
#[derive(Debug)]
struct Feed {
    entries: Vec<NotificationEntry>,
    updates: broadcast::Sender<Vec<NotificationEntry>>,
}

impl Feed {
    fn new(buffer: usize) -> Self {
        let (updates, _) = broadcast::channel(buffer);
        Self {
            entries: Vec::new(),
            updates,
        }
    }

    /// Keep entries ordered by creation time descending.
    fn insert(&mut self, entry: NotificationEntry) {
        let position = self
            .entries
            .iter()
            .position(|existing| existing.created_at < entry.created_at)
            .unwrap_or(self.entries.len());
        self.entries.insert(position, entry);
    }

    fn publish(&self) {
        let _ = self.updates.send(self.entries.clone());
    }
}

/// In-memory notification feed store.
#[derive(Debug)]
pub struct MemoryNotificationStore {
    feeds: DashMap<UserId, Feed>,
    buffer: usize,
}

impl MemoryNotificationStore {
    /// Create a store whose subscription channels hold `buffer` snapshots.
    pub fn new(buffer: usize) -> Self {
        Self {
            feeds: DashMap::new(),
            buffer,
        }
    }
}

impl Default for MemoryNotificationStore {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn push(&self, entry: NotificationEntry) -> AppResult<()> {
        let mut feed = self
            .feeds
            .entry(entry.user_id)
            .or_insert_with(|| Feed::new(self.buffer));
        feed.insert(entry);
        feed.publish();
        Ok(())
    }

    async fn mark_all_read(&self, uid: UserId) -> AppResult<u64> {
        let Some(mut feed) = self.feeds.get_mut(&uid) else {
            return Ok(0);
        };
        let mut changed = 0u64;
        for entry in feed.entries.iter_mut() {
            if !entry.is_read {
                entry.is_read = true;
                changed += 1;
            }
        }
        if changed > 0 {
            feed.publish();
        }
        Ok(changed)
    }

    async fn watch_user(&self, uid: UserId) -> AppResult<Subscription<Vec<NotificationEntry>>> {
        let (snapshot, mut updates) = {
            let feed = self.feeds.entry(uid).or_insert_with(|| Feed::new(self.buffer));
            (feed.entries.clone(), feed.updates.subscribe())
        };

        let (tx, rx) = mpsc::channel(self.buffer);
        let task = tokio::spawn(async move {
            if tx.send(snapshot).await.is_err() {
                return;
            }
            loop {
                match updates.recv().await {
                    Ok(entries) => {
                        if tx.send(entries).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(user_id = %uid, missed, "Notification subscription lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(Subscription::new(rx, task))
    }
}
