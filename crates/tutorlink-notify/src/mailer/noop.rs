//! Configured-off mail backend.

use async_trait::async_trait;
use tracing::trace;

use tutorlink_core::result::AppResult;
use tutorlink_core::traits::mailer::Mailer;

/// Mail backend used when no provider is configured. Drops every send.
#[derive(Debug, Clone, Copy)]
pub struct NoopMailer;

#[async_trait]
impl Mailer for NoopMailer {
    fn is_enabled(&self) -> bool {
        false
    }

    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> AppResult<()> {
        trace!(to, subject, "Mail dispatch disabled, dropping email");
        Ok(())
    }
}
