//! # tutorlink-notify
//!
//! Offline-notification subsystem for TutorLink. Provides:
//!
//! - The offline-notification throttle: at most one email per
//!   continuous offline period, deduplicated by a persisted flag
//! - The notification email formatter with conversation deep links
//! - Transactional mail backends (HTTP API, configured-off no-op)

pub mod email;
pub mod mailer;
pub mod throttle;

pub use mailer::build_mailer;
pub use throttle::OfflineNotifier;
