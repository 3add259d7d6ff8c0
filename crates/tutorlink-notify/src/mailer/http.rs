//! Transactional mail over a JSON HTTP API.

use async_trait::async_trait;

use tutorlink_core::config::notify::MailerConfig;
use tutorlink_core::error::AppError;
use tutorlink_core::result::AppResult;
use tutorlink_core::traits::mailer::Mailer;

/// Mail backend posting to a transactional mail HTTP API.
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    from_address: String,
}

impl HttpMailer {
    /// Create a mailer from configuration.
    pub fn new(config: &MailerConfig) -> Self {
        Self {
            client: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            from_address: config.from_address.clone(),
        }
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, to: &str, subject: &str, html_body: &str) -> AppResult<()> {
        let payload = serde_json::json!({
            "from": self.from_address,
            "to": to,
            "subject": subject,
            "html": html_body,
        });

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|e| {
                AppError::with_source(
                    tutorlink_core::error::ErrorKind::Dispatch,
                    format!("Mail API request failed: {e}"),
                    e,
                )
            })?;

        if !response.status().is_success() {
            return Err(AppError::dispatch(format!(
                "Mail API returned {}",
                response.status()
            )));
        }

        Ok(())
    }
}
