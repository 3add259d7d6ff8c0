//! Notification feed entry model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tutorlink_core::types::id::{NotificationId, UserId};

/// A notification feed entry for a user.
///
/// Entries are created by external event producers (new assignment bids,
/// chat messages, admin broadcasts). The only mutation this core performs
/// is a bulk mark-read scoped to one user; entries are never deleted here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationEntry {
    /// Unique notification identifier.
    pub id: NotificationId,
    /// The recipient user.
    pub user_id: UserId,
    /// Notification body text.
    pub message: String,
    /// In-app link target.
    pub link: String,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl NotificationEntry {
    /// Create a new unread entry stamped with the given creation time.
    pub fn new(
        user_id: UserId,
        message: impl Into<String>,
        link: impl Into<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: NotificationId::new(),
            user_id,
            message: message.into(),
            link: link.into(),
            is_read: false,
            created_at,
        }
    }

    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}
