//! Boundary traits with no dependency on domain entities.
//!
//! Traits that mention entity types live in the crate that owns the
//! concern (`tutorlink-store` for the document-store boundary,
//! `tutorlink-session` for the authentication and referral boundaries).

pub mod mailer;

pub use mailer::Mailer;
