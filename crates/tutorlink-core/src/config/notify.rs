//! Offline-notification and mail dispatch configuration.

use serde::{Deserialize, Serialize};

/// Offline-notification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// Base URL used to build deep links in notification emails.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Transactional mail dispatch settings.
    #[serde(default)]
    pub mailer: MailerConfig,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            mailer: MailerConfig::default(),
        }
    }
}

/// Transactional mail dispatch configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailerConfig {
    /// Mail provider backend.
    #[serde(default)]
    pub provider: MailerProvider,
    /// HTTP endpoint of the mail API (http provider only).
    #[serde(default)]
    pub endpoint: String,
    /// API key for the mail API (http provider only).
    #[serde(default)]
    pub api_key: String,
    /// Sender address placed on outgoing mail.
    #[serde(default = "default_from_address")]
    pub from_address: String,
}

impl Default for MailerConfig {
    fn default() -> Self {
        Self {
            provider: MailerProvider::default(),
            endpoint: String::new(),
            api_key: String::new(),
            from_address: default_from_address(),
        }
    }
}

/// Mail provider backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MailerProvider {
    /// Mail dispatch disabled; sends are dropped.
    None,
    /// JSON POST to a transactional mail HTTP API.
    Http,
}

impl Default for MailerProvider {
    fn default() -> Self {
        Self::None
    }
}

impl std::fmt::Display for MailerProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MailerProvider::None => write!(f, "none"),
            MailerProvider::Http => write!(f, "http"),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:3000".to_string()
}

fn default_from_address() -> String {
    "no-reply@tutorlink.app".to_string()
}
