//! Identity token from the authentication boundary.

use serde::{Deserialize, Serialize};

use tutorlink_core::types::id::UserId;

/// A verified identity as reported by the authentication provider.
///
/// Carried by identity-change events; `None` in an event means the
/// session ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Stable unique id.
    pub uid: UserId,
    /// Email address registered with the provider.
    pub email: String,
    /// Whether the provider has verified the email address.
    pub email_verified: bool,
}

impl Identity {
    /// Create an identity token.
    pub fn new(uid: UserId, email: impl Into<String>, email_verified: bool) -> Self {
        Self {
            uid,
            email: email.into(),
            email_verified,
        }
    }
}
