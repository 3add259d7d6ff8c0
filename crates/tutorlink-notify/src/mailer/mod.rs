//! Transactional mail backends.

pub mod http;
pub mod noop;

use std::sync::Arc;

use tutorlink_core::config::notify::{MailerConfig, MailerProvider};
use tutorlink_core::traits::mailer::Mailer;

pub use http::HttpMailer;
pub use noop::NoopMailer;

/// Build the mail backend selected by configuration.
pub fn build_mailer(config: &MailerConfig) -> Arc<dyn Mailer> {
    match config.provider {
        MailerProvider::None => Arc::new(NoopMailer),
        MailerProvider::Http => Arc::new(HttpMailer::new(config)),
    }
}
