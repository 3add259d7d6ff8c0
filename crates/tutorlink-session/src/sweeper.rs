//! Presence reconciliation sweep.
//!
//! Best-effort teardown writes can be dropped, leaving records online
//! with a stale heartbeat. The sweep periodically marks such records
//! offline. It never touches the notified flag; that is reset only at
//! the next online transition.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::broadcast;
use tokio::time;
use tracing::{debug, warn};

use tutorlink_core::config::session::SessionConfig;
use tutorlink_core::events::session::SessionEvent;
use tutorlink_entity::presence::PresencePatch;
use tutorlink_store::traits::PresenceStore;

/// Periodically reconciles stale-heartbeat records to offline.
#[derive(Debug)]
pub struct PresenceSweeper {
    presence: Arc<dyn PresenceStore>,
    config: SessionConfig,
    events: broadcast::Sender<SessionEvent>,
}

impl PresenceSweeper {
    /// Create a sweeper over the given store.
    pub fn new(
        presence: Arc<dyn PresenceStore>,
        config: SessionConfig,
        events: broadcast::Sender<SessionEvent>,
    ) -> Self {
        Self {
            presence,
            config,
            events,
        }
    }

    /// Run the sweep loop until the task is aborted.
    pub async fn run(self) {
        let mut interval = time::interval(Duration::from_secs(self.config.sweep_interval_seconds));
        interval.tick().await;
        loop {
            interval.tick().await;
            self.sweep_once().await;
        }
    }

    /// One reconciliation pass.
    pub async fn sweep_once(&self) {
        let cutoff =
            Utc::now() - chrono::Duration::seconds(self.config.heartbeat_timeout_seconds as i64);

        let stale = match self.presence.stale_online(cutoff).await {
            Ok(stale) => stale,
            Err(e) => {
                warn!(error = %e, "Presence sweep query failed");
                return;
            }
        };

        for uid in stale {
            if let Err(e) = self.presence.merge(uid, PresencePatch::swept_offline()).await {
                warn!(user_id = %uid, error = %e, "Presence sweep write failed");
                continue;
            }
            debug!(user_id = %uid, "Stale presence record swept offline");
            let _ = self.events.send(SessionEvent::SweptOffline { uid });
        }
    }
}
