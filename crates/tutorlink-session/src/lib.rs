//! # tutorlink-session
//!
//! Session lifecycle core for TutorLink. Provides:
//!
//! - The session lifecycle manager: one active identity slot, driven by
//!   identity-change events from the authentication boundary
//! - Heartbeat writes keeping `last_seen` fresh while a session is live
//! - Live projections of the user record and notification feed into
//!   observable state
//! - The idempotent referral credit trigger
//! - The presence reconciliation sweep for stale records

pub mod gateway;
pub mod heartbeat;
pub mod manager;
pub mod referral;
pub mod state;
pub mod sweeper;

pub use gateway::{AuthGateway, ChannelAuthGateway};
pub use manager::SessionLifecycleManager;
pub use referral::{ReferralCreditTrigger, ReferralLedger};
pub use state::{SessionPhase, SessionState};
pub use sweeper::PresenceSweeper;
