//! Transactional mail dispatch boundary.

use async_trait::async_trait;

use crate::result::AppResult;

/// Trait for transactional mail backends.
///
/// Dispatch is fire-and-forget from the caller's perspective: a send
/// either succeeds or fails once, with no retry inside the backend. The
/// mail subsystem may be unconfigured, in which case [`Mailer::is_enabled`]
/// returns `false` and sends are dropped.
#[async_trait]
pub trait Mailer: Send + Sync + std::fmt::Debug + 'static {
    /// Whether the mail subsystem is configured to actually dispatch.
    fn is_enabled(&self) -> bool {
        true
    }

    /// Send a single email. Returns an error on dispatch failure; the
    /// caller decides whether to surface or swallow it.
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()>;
}
