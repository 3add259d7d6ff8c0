//! Offline-notification email formatting.

use tutorlink_entity::notification::ConversationRef;
use tutorlink_entity::presence::UserPresenceRecord;

/// A rendered transactional email.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OfflineEmail {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub html_body: String,
}

/// Render the you-have-a-new-message email for an offline recipient.
///
/// The deep link is built from the configured site base URL and the
/// conversation the message was sent in.
pub fn offline_message_email(
    recipient: &UserPresenceRecord,
    sender_name: &str,
    conversation: &ConversationRef,
    base_url: &str,
) -> OfflineEmail {
    let link = format!("{}{}", base_url.trim_end_matches('/'), conversation.path());
    let greeting = if recipient.display_name.is_empty() {
        "Hi".to_string()
    } else {
        format!("Hi {}", recipient.display_name)
    };

    let subject = format!("New message from {sender_name} on TutorLink");
    let html_body = format!(
        "<p>{greeting},</p>\
         <p><strong>{sender_name}</strong> sent you a message while you were away.</p>\
         <p><a href=\"{link}\">Open the conversation</a> to reply.</p>\
         <p>— The TutorLink team</p>"
    );

    OfflineEmail { subject, html_body }
}
