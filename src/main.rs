//! TutorLink Presence Agent
//!
//! Composition root for the presence core: wires the stores, the session
//! lifecycle manager, and the reconciliation sweep together and runs
//! until a shutdown signal arrives. The embedding application feeds
//! identity-change events through the [`ChannelAuthGateway`] handle.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use tutorlink_core::config::AppConfig;
use tutorlink_core::error::AppError;
use tutorlink_core::result::AppResult;
use tutorlink_core::types::id::UserId;
use tutorlink_session::gateway::AuthGateway;
use tutorlink_session::{
    ChannelAuthGateway, PresenceSweeper, ReferralCreditTrigger, ReferralLedger,
    SessionLifecycleManager,
};
use tutorlink_store::memory::{MemoryNotificationStore, MemoryPresenceStore};
use tutorlink_store::traits::{NotificationStore, PresenceStore};

#[tokio::main]
async fn main() {
    let env = std::env::var("TUTORLINK_ENV").unwrap_or_else(|_| "development".to_string());

    let config = match AppConfig::load(&env) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Presence agent error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
        _ => {
            fmt().pretty().with_env_filter(filter).with_target(true).init();
        }
    }
}

/// Wallet integration lives outside this core; the agent only records
/// that a credit fired.
#[derive(Debug)]
struct LoggingReferralLedger;

#[async_trait::async_trait]
impl ReferralLedger for LoggingReferralLedger {
    async fn credit_referral(&self, referrer: UserId, referred: UserId) -> AppResult<()> {
        tracing::info!(%referrer, %referred, "Referral credit recorded");
        Ok(())
    }
}

/// Main agent run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!("Starting TutorLink presence agent v{}", env!("CARGO_PKG_VERSION"));

    // ── Step 1: Stores ───────────────────────────────────────────
    let presence: Arc<dyn PresenceStore> =
        Arc::new(MemoryPresenceStore::new(config.session.channel_buffer_size));
    let feed: Arc<dyn NotificationStore> =
        Arc::new(MemoryNotificationStore::new(config.session.channel_buffer_size));

    // ── Step 2: Authentication boundary ──────────────────────────
    let gateway = Arc::new(ChannelAuthGateway::default());

    // ── Step 3: Session lifecycle manager ────────────────────────
    let referral = ReferralCreditTrigger::new(
        Arc::clone(&presence),
        Arc::new(LoggingReferralLedger) as Arc<dyn ReferralLedger>,
    );
    let manager = Arc::new(SessionLifecycleManager::new(
        Arc::clone(&presence),
        Arc::clone(&feed),
        Arc::clone(&gateway) as Arc<dyn AuthGateway>,
        referral,
        config.session.clone(),
    ));

    let mut events = manager.subscribe_events();
    tokio::spawn(async move {
        while let Ok(event) = events.recv().await {
            tracing::info!(?event, "Session event");
        }
    });

    let manager_task = {
        let manager = Arc::clone(&manager);
        tokio::spawn(async move { manager.run().await })
    };
    tracing::info!("Session lifecycle manager started");

    // ── Step 4: Reconciliation sweep ─────────────────────────────
    let sweeper = PresenceSweeper::new(
        Arc::clone(&presence),
        config.session.clone(),
        manager.event_sender(),
    );
    let sweeper_task = tokio::spawn(sweeper.run());
    tracing::info!(
        "Presence sweep running every {}s (timeout {}s)",
        config.session.sweep_interval_seconds,
        config.session.heartbeat_timeout_seconds
    );

    // ── Step 5: Graceful shutdown ────────────────────────────────
    tracing::info!("TutorLink presence agent running");
    shutdown_signal().await;
    tracing::info!("Shutdown signal received, starting graceful shutdown...");

    // Best-effort teardown write for the active identity; delivery is
    // not guaranteed.
    manager.shutdown().await;
    sweeper_task.abort();
    manager_task.abort();

    tracing::info!("TutorLink presence agent shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
