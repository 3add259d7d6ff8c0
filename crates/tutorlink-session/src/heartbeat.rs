//! Presence heartbeat loop.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::time;
use tracing::warn;

use tutorlink_core::types::id::UserId;
use tutorlink_entity::presence::PresencePatch;
use tutorlink_store::traits::PresenceStore;

/// Re-write `last_seen` for one identity at a fixed interval.
///
/// Runs until the owning session aborts the task; write failures are
/// logged and the loop keeps going. The online transition already
/// stamped `last_seen`, so the immediate first tick is skipped.
pub async fn run_heartbeat(store: Arc<dyn PresenceStore>, uid: UserId, period: Duration) {
    let mut interval = time::interval(period);
    interval.tick().await;

    loop {
        interval.tick().await;
        if let Err(e) = store.merge(uid, PresencePatch::heartbeat(Utc::now())).await {
            warn!(user_id = %uid, error = %e, "Heartbeat write failed");
        }
    }
}
