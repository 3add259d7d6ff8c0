//! Store boundary traits.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use tutorlink_core::result::AppResult;
use tutorlink_core::types::id::UserId;
use tutorlink_core::types::subscription::Subscription;
use tutorlink_entity::notification::NotificationEntry;
use tutorlink_entity::presence::{PresencePatch, UserPresenceRecord};

/// The per-user presence document boundary.
///
/// Writes are per-document atomic merges with last-write-wins semantics;
/// no cross-document transaction is offered. Subscriptions deliver
/// snapshots at-least-once and redeliver the current value on subscribe.
#[async_trait]
pub trait PresenceStore: Send + Sync + std::fmt::Debug + 'static {
    /// Read a record. Returns `None` if no document exists for the user.
    async fn get(&self, uid: UserId) -> AppResult<Option<UserPresenceRecord>>;

    /// Per-document atomic merge. Creates the document with sparse
    /// defaults when absent.
    async fn merge(&self, uid: UserId, patch: PresencePatch) -> AppResult<()>;

    /// Insert a full record only if no document exists yet. Returns
    /// `true` if this call inserted it.
    async fn create_if_absent(&self, record: UserPresenceRecord) -> AppResult<bool>;

    /// Open a live subscription on one record. The current value is
    /// delivered first.
    async fn watch(&self, uid: UserId) -> AppResult<Subscription<UserPresenceRecord>>;

    /// Atomically claim the referral credit for a user: iff the record
    /// exists, carries a referrer, and has not been credited yet, flip
    /// the credited flag and return the referrer. At most one concurrent
    /// caller observes `Some`.
    async fn claim_referral_credit(&self, uid: UserId) -> AppResult<Option<UserId>>;

    /// Users whose record is online but whose `last_seen` is older than
    /// the cutoff. Input to the reconciliation sweep.
    async fn stale_online(&self, cutoff: DateTime<Utc>) -> AppResult<Vec<UserId>>;
}

/// The per-user notification feed boundary.
#[async_trait]
pub trait NotificationStore: Send + Sync + std::fmt::Debug + 'static {
    /// Append an entry to the recipient's feed.
    async fn push(&self, entry: NotificationEntry) -> AppResult<()>;

    /// Mark every entry of one user as read. Returns how many changed.
    async fn mark_all_read(&self, uid: UserId) -> AppResult<u64>;

    /// Open a live subscription on one user's feed, ordered by creation
    /// time descending. The full ordered set is delivered on every
    /// change, current value first.
    async fn watch_user(&self, uid: UserId) -> AppResult<Subscription<Vec<NotificationEntry>>>;
}
