//! Shared test helpers for integration tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use tutorlink_core::config::session::SessionConfig;
use tutorlink_core::result::AppResult;
use tutorlink_core::traits::mailer::Mailer;
use tutorlink_core::types::id::UserId;
use tutorlink_entity::identity::Identity;
use tutorlink_entity::presence::UserPresenceRecord;
use tutorlink_session::gateway::AuthGateway;
use tutorlink_session::{ChannelAuthGateway, ReferralCreditTrigger, ReferralLedger, SessionLifecycleManager};
use tutorlink_store::memory::{MemoryNotificationStore, MemoryPresenceStore};
use tutorlink_store::traits::{NotificationStore, PresenceStore};

/// Referral ledger that records every credit.
#[derive(Debug, Default)]
pub struct RecordingLedger {
    pub credits: Mutex<Vec<(UserId, UserId)>>,
}

#[async_trait]
impl ReferralLedger for RecordingLedger {
    async fn credit_referral(&self, referrer: UserId, referred: UserId) -> AppResult<()> {
        self.credits
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((referrer, referred));
        Ok(())
    }
}

/// Mailer that records every send.
#[derive(Debug, Default)]
pub struct RecordingMailer {
    pub sent: Mutex<Vec<(String, String)>>,
}

impl RecordingMailer {
    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, to: &str, subject: &str, _html_body: &str) -> AppResult<()> {
        self.sent
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((to.to_string(), subject.to_string()));
        Ok(())
    }
}

/// The wired presence core under test.
pub struct TestCore {
    pub presence: Arc<MemoryPresenceStore>,
    pub feed: Arc<MemoryNotificationStore>,
    pub gateway: Arc<ChannelAuthGateway>,
    pub ledger: Arc<RecordingLedger>,
    pub manager: Arc<SessionLifecycleManager>,
}

impl TestCore {
    /// Build and start the core with the default session config.
    pub async fn new() -> Self {
        Self::with_config(SessionConfig::default()).await
    }

    /// Build and start the core with a custom session config.
    pub async fn with_config(config: SessionConfig) -> Self {
        let presence = Arc::new(MemoryPresenceStore::default());
        let feed = Arc::new(MemoryNotificationStore::default());
        let gateway = Arc::new(ChannelAuthGateway::default());
        let ledger = Arc::new(RecordingLedger::default());

        let referral = ReferralCreditTrigger::new(
            Arc::clone(&presence) as Arc<dyn PresenceStore>,
            Arc::clone(&ledger) as Arc<dyn ReferralLedger>,
        );
        let manager = Arc::new(SessionLifecycleManager::new(
            Arc::clone(&presence) as Arc<dyn PresenceStore>,
            Arc::clone(&feed) as Arc<dyn NotificationStore>,
            Arc::clone(&gateway) as Arc<dyn AuthGateway>,
            referral,
            config,
        ));

        // Subscribe before spawning so the first sign-in cannot race the
        // event loop's startup.
        let events = gateway.subscribe();
        {
            let manager = Arc::clone(&manager);
            tokio::spawn(async move { manager.drive(events).await });
        }

        Self {
            presence,
            feed,
            gateway,
            ledger,
            manager,
        }
    }

    /// Report a sign-in through the auth boundary.
    pub async fn sign_in(&self, identity: Identity) {
        self.gateway.signed_in(identity).await;
    }

    /// Report a sign-out through the auth boundary.
    pub async fn sign_out_event(&self) {
        self.gateway.signed_out().await;
    }

    /// Fetch a record, panicking if the store errs.
    pub async fn record(&self, uid: UserId) -> Option<UserPresenceRecord> {
        self.presence.get(uid).await.expect("presence read")
    }
}

/// An identity with a verified email.
pub fn verified_identity(uid: UserId, email: &str) -> Identity {
    Identity::new(uid, email, true)
}

/// Seed a full offline record with an email address on file.
pub async fn seed_record(core: &TestCore, uid: UserId, email: &str) -> UserPresenceRecord {
    let mut record = UserPresenceRecord::with_defaults(uid, Utc::now());
    record.email = email.to_string();
    record.display_name = "Test User".to_string();
    core.presence
        .create_if_absent(record.clone())
        .await
        .expect("seed record");
    record
}

/// Poll until the condition holds, panicking after two seconds.
pub async fn wait_until<F>(description: &str, condition: F)
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if condition() {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("Timed out waiting for: {description}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Poll an async probe until it returns true, panicking after two seconds.
pub async fn wait_until_async<F, Fut>(description: &str, probe: F)
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    loop {
        if probe().await {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            panic!("Timed out waiting for: {description}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
