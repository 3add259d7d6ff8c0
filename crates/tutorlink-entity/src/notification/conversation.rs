//! Conversation references for notification deep links.

use serde::{Deserialize, Serialize};

use tutorlink_core::types::id::{AssignmentId, UserId};

/// The conversation a message was sent in, used to build the deep link
/// in an offline-notification email.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConversationRef {
    /// The chat attached to an assignment.
    Assignment(AssignmentId),
    /// The support chat of a user.
    Support(UserId),
}

impl ConversationRef {
    /// The in-app path of the conversation, relative to the site root.
    pub fn path(&self) -> String {
        match self {
            Self::Assignment(id) => format!("/assignments/{id}/chat"),
            Self::Support(uid) => format!("/support/{uid}"),
        }
    }
}
