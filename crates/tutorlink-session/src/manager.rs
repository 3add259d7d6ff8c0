//! Session lifecycle manager.
//!
//! Owns the single active identity slot: reacts to identity-change
//! events from the authentication boundary, manages the heartbeat task,
//! opens and closes the record and notification-feed subscriptions, and
//! publishes observable state for the rest of the application.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use tutorlink_core::config::session::SessionConfig;
use tutorlink_core::events::session::SessionEvent;
use tutorlink_core::result::AppResult;
use tutorlink_core::AppError;
use tutorlink_core::types::id::UserId;
use tutorlink_entity::identity::Identity;
use tutorlink_entity::presence::{PresencePatch, UserPresenceRecord};
use tutorlink_store::traits::{NotificationStore, PresenceStore};

use crate::gateway::{AuthGateway, IdentityEvent};
use crate::heartbeat::run_heartbeat;
use crate::referral::ReferralCreditTrigger;
use crate::state::{ObservableState, SessionPhase, SessionState};

/// Task handles of one established session. Destroyed on sign-out,
/// identity change, or process teardown.
#[derive(Debug)]
struct SessionHandle {
    identity: Identity,
    tasks: Vec<JoinHandle<()>>,
}

impl SessionHandle {
    /// Abort every task immediately. In-flight snapshots for the
    /// cancelled subscriptions are discarded, never projected.
    fn cancel(self) -> Identity {
        for task in &self.tasks {
            task.abort();
        }
        self.identity
    }
}

/// Manages the complete client-session lifecycle.
///
/// At most one heartbeat task and one pair of subscriptions are live at
/// any instant, scoped to exactly one identity.
#[derive(Debug)]
pub struct SessionLifecycleManager {
    presence: Arc<dyn PresenceStore>,
    feed: Arc<dyn NotificationStore>,
    auth: Arc<dyn AuthGateway>,
    referral: ReferralCreditTrigger,
    config: SessionConfig,
    observable: ObservableState,
    state: SessionState,
    active: Mutex<Option<SessionHandle>>,
    events: broadcast::Sender<SessionEvent>,
}

impl SessionLifecycleManager {
    /// Creates a new manager with all required collaborators.
    pub fn new(
        presence: Arc<dyn PresenceStore>,
        feed: Arc<dyn NotificationStore>,
        auth: Arc<dyn AuthGateway>,
        referral: ReferralCreditTrigger,
        config: SessionConfig,
    ) -> Self {
        let (observable, state) = ObservableState::channel();
        let (events, _) = broadcast::channel(32);
        Self {
            presence,
            feed,
            auth,
            referral,
            config,
            observable,
            state,
            active: Mutex::new(None),
            events,
        }
    }

    /// The clonable read accessor over the observable state.
    pub fn state(&self) -> SessionState {
        self.state.clone()
    }

    /// Subscribe to session domain events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// The event sender, for components that emit into the same stream.
    pub fn event_sender(&self) -> broadcast::Sender<SessionEvent> {
        self.events.clone()
    }

    /// Drive the manager from the authentication boundary's event
    /// stream. Runs until the gateway is dropped.
    pub async fn run(&self) {
        let events = self.auth.subscribe();
        self.drive(events).await;
    }

    /// Process identity events from an already-open subscription until
    /// it closes. Lets the caller subscribe before spawning so no early
    /// event is missed.
    pub async fn drive(&self, mut events: mpsc::Receiver<IdentityEvent>) {
        while let Some(event) = events.recv().await {
            self.handle_identity_change(event).await;
        }
        debug!("Identity event stream closed");
    }

    /// Process one identity-change event.
    pub async fn handle_identity_change(&self, next: Option<Identity>) {
        let mut active = self.active.lock().await;

        // Cancel the previous session's tasks before any new-identity
        // side effect runs, then wipe the projections it published.
        let previous = active.take().map(SessionHandle::cancel);
        self.observable.clear_projections();

        if let Some(prev) = &previous {
            let differs = next
                .as_ref()
                .map(|identity| identity.uid != prev.uid)
                .unwrap_or(true);
            if differs {
                self.spawn_offline_write(prev.uid);
            }
            match &next {
                Some(identity) if identity.uid != prev.uid => {
                    self.emit(SessionEvent::IdentitySwitched {
                        from: prev.uid,
                        to: identity.uid,
                    });
                }
                Some(_) => debug!(user_id = %prev.uid, "Re-establishing session for same identity"),
                None => self.emit(SessionEvent::SignedOut { uid: prev.uid }),
            }
        }

        let Some(identity) = next else {
            self.observable.set_phase(SessionPhase::SignedOut);
            return;
        };

        if previous.is_none() {
            self.emit(SessionEvent::SignedIn { uid: identity.uid });
        }

        *active = Some(self.establish(identity).await);
    }

    /// Best-effort offline write for the current identity, then ask the
    /// authentication boundary to end the session. The resulting null
    /// identity event performs the actual teardown.
    pub async fn sign_out(&self) -> AppResult<()> {
        let uid = {
            let active = self.active.lock().await;
            active.as_ref().map(|handle| handle.identity.uid)
        };

        let Some(uid) = uid else {
            return Err(AppError::session("No active identity to sign out"));
        };

        if let Err(e) = self.presence.merge(uid, PresencePatch::offline(Utc::now())).await {
            warn!(user_id = %uid, error = %e, "Offline write during sign-out failed");
        }

        self.auth.sign_out().await
    }

    /// Best-effort teardown hook for process shutdown: cancels the
    /// session tasks and attempts a single offline write. No retry, no
    /// acknowledgment; delivery is not guaranteed.
    pub async fn shutdown(&self) {
        let mut active = self.active.lock().await;
        if let Some(handle) = active.take() {
            let identity = handle.cancel();
            if let Err(e) = self
                .presence
                .merge(identity.uid, PresencePatch::offline(Utc::now()))
                .await
            {
                warn!(user_id = %identity.uid, error = %e, "Offline write during shutdown failed");
            }
            self.emit(SessionEvent::SignedOut { uid: identity.uid });
        }
        self.observable.clear_projections();
        self.observable.set_phase(SessionPhase::SignedOut);
    }

    /// Bulk mark-read over the active identity's notification feed.
    pub async fn mark_notifications_read(&self) -> AppResult<u64> {
        let uid = {
            let active = self.active.lock().await;
            active.as_ref().map(|handle| handle.identity.uid)
        };
        let Some(uid) = uid else {
            return Err(AppError::session("No active identity"));
        };
        self.feed.mark_all_read(uid).await
    }

    /// Establish a session for a freshly signed-in identity.
    async fn establish(&self, identity: Identity) -> SessionHandle {
        let uid = identity.uid;
        let now = Utc::now();
        self.observable.set_phase(SessionPhase::Establishing(uid));

        // One initial read serves the bootstrap-existence check and
        // referral eligibility; merge has upsert semantics, so reading
        // afterwards could never observe a missing record.
        let (initial, read_ok) = match self.presence.get(uid).await {
            Ok(record) => (record, true),
            Err(e) => {
                error!(user_id = %uid, error = %e, "Initial record read failed");
                self.observable.set_phase(SessionPhase::LoadFailed(uid));
                self.emit(SessionEvent::EstablishFailed { uid });
                (None, false)
            }
        };

        if read_ok && initial.is_none() && self.is_bootstrap(&identity) {
            let record = UserPresenceRecord::bootstrap_admin(uid, &identity.email, now);
            match self.presence.create_if_absent(record).await {
                Ok(true) => info!(user_id = %uid, "Bootstrap record created"),
                Ok(false) => debug!(user_id = %uid, "Bootstrap record already present"),
                Err(e) => warn!(user_id = %uid, error = %e, "Bootstrap record creation failed"),
            }
        }

        if let Err(e) = self.presence.merge(uid, PresencePatch::online(now)).await {
            warn!(user_id = %uid, error = %e, "Online presence write failed");
        }

        let heartbeat_task = tokio::spawn(run_heartbeat(
            Arc::clone(&self.presence),
            uid,
            Duration::from_secs(self.config.heartbeat_interval_seconds),
        ));

        if let Some(record) = initial.as_ref() {
            self.referral.credit_if_eligible(&identity, record).await;
        }

        let record_task = tokio::spawn(project_record(
            Arc::clone(&self.presence),
            uid,
            self.observable.clone(),
        ));
        let feed_task = tokio::spawn(project_feed(
            Arc::clone(&self.feed),
            uid,
            self.observable.clone(),
        ));

        SessionHandle {
            identity,
            tasks: vec![heartbeat_task, record_task, feed_task],
        }
    }

    /// Issue an offline write without awaiting it. The heartbeat task is
    /// already cancelled at this point, so no stale heartbeat can land
    /// after the offline status.
    fn spawn_offline_write(&self, uid: UserId) {
        let presence = Arc::clone(&self.presence);
        tokio::spawn(async move {
            if let Err(e) = presence.merge(uid, PresencePatch::offline(Utc::now())).await {
                warn!(user_id = %uid, error = %e, "Offline presence write failed");
            }
        });
    }

    fn is_bootstrap(&self, identity: &Identity) -> bool {
        self.config
            .bootstrap_email
            .as_deref()
            .is_some_and(|email| email.eq_ignore_ascii_case(&identity.email))
    }

    fn emit(&self, event: SessionEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

/// Project record snapshots into the observable state. The first
/// delivered snapshot moves the phase from Establishing to Active.
async fn project_record(presence: Arc<dyn PresenceStore>, uid: UserId, observable: ObservableState) {
    let mut subscription = match presence.watch(uid).await {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!(user_id = %uid, error = %e, "Record subscription failed");
            return;
        }
    };

    let mut first = true;
    while let Some(record) = subscription.recv().await {
        if first {
            observable.mark_active(uid);
            first = false;
        }
        observable.set_record(record);
    }
}

/// Project notification feed snapshots into the observable state.
async fn project_feed(feed: Arc<dyn NotificationStore>, uid: UserId, observable: ObservableState) {
    let mut subscription = match feed.watch_user(uid).await {
        Ok(subscription) => subscription,
        Err(e) => {
            warn!(user_id = %uid, error = %e, "Notification subscription failed");
            return;
        }
    };

    while let Some(entries) = subscription.recv().await {
        observable.set_notifications(entries);
    }
}
