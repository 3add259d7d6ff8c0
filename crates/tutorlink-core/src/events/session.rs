//! Session-related domain events.

use serde::{Deserialize, Serialize};

use crate::types::id::UserId;

/// Events emitted by the session lifecycle manager.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SessionEvent {
    /// An identity signed in and its session is being established.
    SignedIn {
        /// The user ID.
        uid: UserId,
    },
    /// The active identity signed out or the session was torn down.
    SignedOut {
        /// The user ID.
        uid: UserId,
    },
    /// The active identity was replaced by another without an
    /// intervening sign-out.
    IdentitySwitched {
        /// The previous user ID.
        from: UserId,
        /// The new user ID.
        to: UserId,
    },
    /// The initial record read failed while establishing a session.
    EstablishFailed {
        /// The user ID.
        uid: UserId,
    },
    /// The reconciliation sweep marked a stale record offline.
    SweptOffline {
        /// The user ID.
        uid: UserId,
    },
}
