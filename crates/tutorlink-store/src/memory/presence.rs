//! In-memory presence store.
//!
//! One dashmap entry per user document. Merges run under the map's
//! per-entry lock, which is what makes them per-document atomic. Every
//! document carries a broadcast channel; subscriptions forward from it
//! onto a bounded channel, current snapshot first.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use tutorlink_core::result::AppResult;
use tutorlink_core::types::id::UserId;
use tutorlink_core::types::subscription::Subscription;
use tutorlink_entity::presence::{PresencePatch, UserPresenceRecord};

use crate::traits::PresenceStore;

/// One user document plus its change feed.
#[derive(Debug)]
struct PresenceDoc {
    record: UserPresenceRecord,
    updates: broadcast::Sender<UserPresenceRecord>,
}

impl PresenceDoc {
    fn new(record: UserPresenceRecord, buffer: usize) -> Self {
        let (updates, _) = broadcast::channel(buffer);
        Self { record, updates }
    }

    fn publish(&self) {
        // No receivers is fine; nobody is watching this document.
        let _ = self.updates.send(self.record.clone());
    }
}

/// In-memory presence store.
#[derive(Debug)]
pub struct MemoryPresenceStore {
    docs: DashMap<UserId, PresenceDoc>,
    buffer: usize,
}

impl MemoryPresenceStore {
    /// Create a store whose subscription channels hold `buffer` snapshots.
    pub fn new(buffer: usize) -> Self {
        Self {
            docs: DashMap::new(),
            buffer,
        }
    }
}

impl Default for MemoryPresenceStore {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl PresenceStore for MemoryPresenceStore {
    async fn get(&self, uid: UserId) -> AppResult<Option<UserPresenceRecord>> {
        Ok(self.docs.get(&uid).map(|doc| doc.record.clone()))
    }

    async fn merge(&self, uid: UserId, patch: PresencePatch) -> AppResult<()> {
        let mut doc = self
            .docs
            .entry(uid)
            .or_insert_with(|| PresenceDoc::new(UserPresenceRecord::with_defaults(uid, Utc::now()), self.buffer));
        patch.apply(&mut doc.record);
        doc.publish();
        Ok(())
    }

    async fn create_if_absent(&self, record: UserPresenceRecord) -> AppResult<bool> {
        match self.docs.entry(record.uid) {
            Entry::Occupied(_) => Ok(false),
            Entry::Vacant(slot) => {
                slot.insert(PresenceDoc::new(record, self.buffer));
                Ok(true)
            }
        }
    }

    async fn watch(&self, uid: UserId) -> AppResult<Subscription<UserPresenceRecord>> {
        let (snapshot, mut updates) = {
            let doc = self
                .docs
                .entry(uid)
                .or_insert_with(|| PresenceDoc::new(UserPresenceRecord::with_defaults(uid, Utc::now()), self.buffer));
            (doc.record.clone(), doc.updates.subscribe())
        };

        let (tx, rx) = mpsc::channel(self.buffer);
        let task = tokio::spawn(async move {
            if tx.send(snapshot).await.is_err() {
                return;
            }
            loop {
                match updates.recv().await {
                    Ok(record) => {
                        if tx.send(record).await.is_err() {
                            break;
                        }
                    }
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        warn!(user_id = %uid, missed, "Presence subscription lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });

        Ok(Subscription::new(rx, task))
    }

    async fn claim_referral_credit(&self, uid: UserId) -> AppResult<Option<UserId>> {
        let Some(mut doc) = self.docs.get_mut(&uid) else {
            return Ok(None);
        };
        if doc.record.email_verification_credited {
            return Ok(None);
        }
        let Some(referrer) = doc.record.referred_by else {
            return Ok(None);
        };
        doc.record.email_verification_credited = true;
        doc.publish();
        Ok(Some(referrer))
    }

    async fn stale_online(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<UserId>> {
        Ok(self
            .docs
            .iter()
            .filter(|doc| doc.record.is_online && doc.record.last_seen < cutoff)
            .map(|doc| *doc.key())
            .collect())
    }
}
