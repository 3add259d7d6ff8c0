//! Offline-notification throttle.
//!
//! Message-send paths call [`OfflineNotifier::notify_if_offline`] after
//! a message is durably stored. Across any maximal interval where the
//! recipient stays offline, at most one email goes out: the persisted
//! notified flag, not a timer, is the deduplication key, so the throttle
//! holds across restarts of the calling process.

use std::sync::Arc;

use tracing::{debug, warn};

use tutorlink_core::config::notify::NotifyConfig;
use tutorlink_core::traits::mailer::Mailer;
use tutorlink_core::types::id::UserId;
use tutorlink_entity::notification::ConversationRef;
use tutorlink_entity::presence::PresencePatch;
use tutorlink_store::traits::PresenceStore;

use crate::email::offline_message_email;

/// Decides, at message-delivery time, whether to dispatch the one email
/// of the current offline period.
#[derive(Debug, Clone)]
pub struct OfflineNotifier {
    presence: Arc<dyn PresenceStore>,
    mailer: Arc<dyn Mailer>,
    config: NotifyConfig,
}

impl OfflineNotifier {
    /// Create a notifier over the given store and mail backend.
    pub fn new(
        presence: Arc<dyn PresenceStore>,
        mailer: Arc<dyn Mailer>,
        config: NotifyConfig,
    ) -> Self {
        Self {
            presence,
            mailer,
            config,
        }
    }

    /// Send at most one offline-notification email for the recipient's
    /// current offline period.
    ///
    /// Never returns an error: store and dispatch failures are logged
    /// and swallowed so they cannot block message delivery.
    pub async fn notify_if_offline(
        &self,
        recipient: UserId,
        sender_name: &str,
        conversation: &ConversationRef,
    ) {
        if !self.mailer.is_enabled() {
            return;
        }

        let record = match self.presence.get(recipient).await {
            Ok(Some(record)) => record,
            // Never fabricate a record from the notification path.
            Ok(None) => return,
            Err(e) => {
                warn!(user_id = %recipient, error = %e, "Presence read failed, skipping notification");
                return;
            }
        };

        if record.is_online || record.notified_for_offline_message {
            return;
        }

        if record.email.is_empty() {
            debug!(user_id = %recipient, "Recipient has no email address on record");
            return;
        }

        let email = offline_message_email(&record, sender_name, conversation, &self.config.base_url);

        match self.mailer.send(&record.email, &email.subject, &email.html_body).await {
            Ok(()) => {
                if let Err(e) = self
                    .presence
                    .merge(recipient, PresencePatch::notified())
                    .await
                {
                    warn!(user_id = %recipient, error = %e, "Failed to persist notified flag");
                }
                debug!(user_id = %recipient, "Offline notification dispatched");
            }
            Err(e) => {
                warn!(user_id = %recipient, error = %e, "Offline notification dispatch failed");
            }
        }
    }
}
