//! User presence record — the per-user document shared between the
//! session lifecycle manager and the offline-notification throttle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutorlink_core::types::id::UserId;

use super::role::UserRole;

/// The per-user document in the presence store.
///
/// Writers: the session lifecycle manager (online status, heartbeat,
/// offline writes) and the offline-notification throttle (notified flag).
/// Readers: any message-send path deciding whether to notify.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserPresenceRecord {
    /// Stable identity key.
    pub uid: UserId,
    /// Email address notifications are delivered to.
    pub email: String,
    /// Human-readable display name.
    pub display_name: String,
    /// Marketplace role.
    pub role: UserRole,
    /// True while at least one live session believes it is connected.
    pub is_online: bool,
    /// Last heartbeat or transition timestamp.
    pub last_seen: DateTime<Utc>,
    /// True once an offline-notification email has been sent during the
    /// current offline period. Reset to false exactly at the online
    /// transition.
    pub notified_for_offline_message: bool,
    /// True once the one-time referral credit has fired. Never reset.
    pub email_verification_credited: bool,
    /// The identity that referred this user, if any.
    pub referred_by: Option<UserId>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl UserPresenceRecord {
    /// A sparse record created implicitly by a merge against a missing
    /// document. Profile fields are filled in elsewhere (registration is
    /// outside this core).
    pub fn with_defaults(uid: UserId, now: DateTime<Utc>) -> Self {
        Self {
            uid,
            email: String::new(),
            display_name: String::new(),
            role: UserRole::Student,
            is_online: false,
            last_seen: now,
            notified_for_offline_message: false,
            email_verification_credited: false,
            referred_by: None,
            created_at: now,
        }
    }

    /// The privileged record created on the bootstrap identity's first
    /// sign-in.
    pub fn bootstrap_admin(uid: UserId, email: &str, now: DateTime<Utc>) -> Self {
        Self {
            uid,
            email: email.to_string(),
            display_name: "Administrator".to_string(),
            role: UserRole::Admin,
            is_online: true,
            last_seen: now,
            notified_for_offline_message: false,
            email_verification_credited: false,
            referred_by: None,
            created_at: now,
        }
    }
}

/// Partial presence record for merge writes. Absent fields are left
/// untouched by the merge.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PresencePatch {
    /// New online flag, if changing.
    pub is_online: Option<bool>,
    /// New last-seen timestamp, if changing.
    pub last_seen: Option<DateTime<Utc>>,
    /// New notified flag, if changing.
    pub notified_for_offline_message: Option<bool>,
}

impl PresencePatch {
    /// The online transition: connected, seen now, notified flag cleared.
    pub fn online(now: DateTime<Utc>) -> Self {
        Self {
            is_online: Some(true),
            last_seen: Some(now),
            notified_for_offline_message: Some(false),
        }
    }

    /// The offline transition: disconnected, seen now.
    pub fn offline(now: DateTime<Utc>) -> Self {
        Self {
            is_online: Some(false),
            last_seen: Some(now),
            notified_for_offline_message: None,
        }
    }

    /// A heartbeat write: only the last-seen timestamp moves.
    pub fn heartbeat(now: DateTime<Utc>) -> Self {
        Self {
            is_online: None,
            last_seen: Some(now),
            notified_for_offline_message: None,
        }
    }

    /// Marks the current offline period as notified.
    pub fn notified() -> Self {
        Self {
            is_online: None,
            last_seen: None,
            notified_for_offline_message: Some(true),
        }
    }

    /// The reconciliation sweep write: offline, but the last honest
    /// heartbeat timestamp and the notified flag are left alone.
    pub fn swept_offline() -> Self {
        Self {
            is_online: Some(false),
            last_seen: None,
            notified_for_offline_message: None,
        }
    }

    /// Apply this patch to a record, field by field.
    pub fn apply(&self, record: &mut UserPresenceRecord) {
        if let Some(is_online) = self.is_online {
            record.is_online = is_online;
        }
        if let Some(last_seen) = self.last_seen {
            record.last_seen = last_seen;
        }
        if let Some(notified) = self.notified_for_offline_message {
            record.notified_for_offline_message = notified;
        }
    }
}
