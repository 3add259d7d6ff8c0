//! # tutorlink-entity
//!
//! Domain entity models for TutorLink's presence core. Every struct in
//! this crate represents a document in the backing store or a value
//! object crossing a boundary. All entities derive `Debug`, `Clone`,
//! `Serialize`, and `Deserialize`.

pub mod identity;
pub mod notification;
pub mod presence;

pub use identity::Identity;
pub use notification::{ConversationRef, NotificationEntry};
pub use presence::{PresencePatch, UserPresenceRecord, UserRole};
