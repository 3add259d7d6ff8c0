//! Observable session state.
//!
//! The manager owns the canonical state and publishes it over watch
//! channels; the rest of the application reads it through a clonable
//! [`SessionState`] accessor injected where needed, never through global
//! mutable state.

use std::sync::Arc;

use tokio::sync::watch;

use tutorlink_core::types::id::UserId;
use tutorlink_entity::notification::NotificationEntry;
use tutorlink_entity::presence::UserPresenceRecord;

/// Phase of the single active identity slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No identity is signed in.
    SignedOut,
    /// An identity signed in; subscriptions are being established.
    Establishing(UserId),
    /// The record subscription delivered its first snapshot.
    Active(UserId),
    /// The initial record read failed; shown as a generic
    /// could-not-load state.
    LoadFailed(UserId),
}

impl SessionPhase {
    /// The identity bound to this phase, if any.
    pub fn uid(&self) -> Option<UserId> {
        match self {
            Self::SignedOut => None,
            Self::Establishing(uid) | Self::Active(uid) | Self::LoadFailed(uid) => Some(*uid),
        }
    }
}

/// Clonable read accessor over the manager's observable state.
#[derive(Debug, Clone)]
pub struct SessionState {
    phase: watch::Receiver<SessionPhase>,
    record: watch::Receiver<Option<UserPresenceRecord>>,
    notifications: watch::Receiver<Vec<NotificationEntry>>,
}

impl SessionState {
    /// Current phase.
    pub fn phase(&self) -> SessionPhase {
        *self.phase.borrow()
    }

    /// Latest projected record snapshot, if any.
    pub fn record(&self) -> Option<UserPresenceRecord> {
        self.record.borrow().clone()
    }

    /// Latest projected notification feed, newest first.
    pub fn notifications(&self) -> Vec<NotificationEntry> {
        self.notifications.borrow().clone()
    }

    /// Number of unread notifications in the projected feed.
    pub fn unread_count(&self) -> usize {
        self.notifications
            .borrow()
            .iter()
            .filter(|entry| entry.is_unread())
            .count()
    }

    /// A fresh watch receiver for phase changes.
    pub fn phase_stream(&self) -> watch::Receiver<SessionPhase> {
        self.phase.clone()
    }

    /// A fresh watch receiver for record snapshots.
    pub fn record_stream(&self) -> watch::Receiver<Option<UserPresenceRecord>> {
        self.record.clone()
    }

    /// A fresh watch receiver for notification feed snapshots.
    pub fn notification_stream(&self) -> watch::Receiver<Vec<NotificationEntry>> {
        self.notifications.clone()
    }
}

/// Write side of the observable state, held by the manager and its
/// projection tasks.
#[derive(Debug, Clone)]
pub(crate) struct ObservableState {
    phase: Arc<watch::Sender<SessionPhase>>,
    record: Arc<watch::Sender<Option<UserPresenceRecord>>>,
    notifications: Arc<watch::Sender<Vec<NotificationEntry>>>,
}

impl ObservableState {
    /// Create the paired write and read halves.
    pub(crate) fn channel() -> (Self, SessionState) {
        let (phase_tx, phase_rx) = watch::channel(SessionPhase::SignedOut);
        let (record_tx, record_rx) = watch::channel(None);
        let (notifications_tx, notifications_rx) = watch::channel(Vec::new());

        let writer = Self {
            phase: Arc::new(phase_tx),
            record: Arc::new(record_tx),
            notifications: Arc::new(notifications_tx),
        };
        let reader = SessionState {
            phase: phase_rx,
            record: record_rx,
            notifications: notifications_rx,
        };
        (writer, reader)
    }

    pub(crate) fn set_phase(&self, phase: SessionPhase) {
        self.phase.send_replace(phase);
    }

    /// Establishing → Active, gated on the phase still belonging to the
    /// same identity. A snapshot arriving after a switch began must not
    /// resurrect the old identity's phase.
    pub(crate) fn mark_active(&self, uid: UserId) {
        self.phase.send_if_modified(|phase| match phase {
            SessionPhase::Establishing(current) | SessionPhase::LoadFailed(current)
                if *current == uid =>
            {
                *phase = SessionPhase::Active(uid);
                true
            }
            _ => false,
        });
    }

    pub(crate) fn set_record(&self, record: UserPresenceRecord) {
        self.record.send_replace(Some(record));
    }

    pub(crate) fn set_notifications(&self, entries: Vec<NotificationEntry>) {
        self.notifications.send_replace(entries);
    }

    /// Wipe projections so no stale state from a previous identity is
    /// observable once a switch begins.
    pub(crate) fn clear_projections(&self) {
        self.record.send_replace(None);
        self.notifications.send_replace(Vec::new());
    }
}
