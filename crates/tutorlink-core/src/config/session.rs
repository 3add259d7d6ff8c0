//! Session lifecycle and presence configuration.

use serde::{Deserialize, Serialize};

/// Session lifecycle and presence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Heartbeat interval in seconds between `last_seen` writes.
    #[serde(default = "default_heartbeat_interval")]
    pub heartbeat_interval_seconds: u64,
    /// Heartbeat timeout in seconds before a record is considered stale
    /// and eligible for the reconciliation sweep.
    #[serde(default = "default_heartbeat_timeout")]
    pub heartbeat_timeout_seconds: u64,
    /// Interval in seconds between presence reconciliation sweeps.
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// Buffer size for subscription snapshot channels.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Email address of the designated bootstrap identity. The first
    /// sign-in of this identity creates a privileged record.
    #[serde(default)]
    pub bootstrap_email: Option<String>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_seconds: default_heartbeat_interval(),
            heartbeat_timeout_seconds: default_heartbeat_timeout(),
            sweep_interval_seconds: default_sweep_interval(),
            channel_buffer_size: default_channel_buffer(),
            bootstrap_email: None,
        }
    }
}

fn default_heartbeat_interval() -> u64 {
    30
}

fn default_heartbeat_timeout() -> u64 {
    90
}

fn default_sweep_interval() -> u64 {
    60
}

fn default_channel_buffer() -> usize {
    64
}
