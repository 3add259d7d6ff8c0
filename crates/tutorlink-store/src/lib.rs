//! # tutorlink-store
//!
//! Document-store boundary for TutorLink's presence core. Defines the
//! [`PresenceStore`] and [`NotificationStore`] traits the rest of the
//! system is written against, plus the dashmap-backed in-process
//! implementation used in tests and single-node deployments.
//!
//! The managed document database behind the production deployment is an
//! external collaborator; an adapter for it implements these same traits.

pub mod memory;
pub mod traits;

pub use memory::{MemoryNotificationStore, MemoryPresenceStore};
pub use traits::{NotificationStore, PresenceStore};
