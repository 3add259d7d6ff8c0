//! Integration tests for the offline-notification throttle, run against
//! the same store the session lifecycle manager writes to.

use std::sync::Arc;

use tutorlink_core::config::notify::{MailerConfig, NotifyConfig};
use tutorlink_core::traits::mailer::Mailer;
use tutorlink_core::types::id::{AssignmentId, UserId};
use tutorlink_entity::notification::ConversationRef;
use tutorlink_notify::{OfflineNotifier, build_mailer};
use tutorlink_session::SessionPhase;
use tutorlink_store::traits::PresenceStore;

use crate::helpers::{RecordingMailer, TestCore, seed_record, verified_identity, wait_until, wait_until_async};

fn notifier_for(core: &TestCore, mailer: Arc<dyn Mailer>) -> OfflineNotifier {
    OfflineNotifier::new(
        Arc::clone(&core.presence) as Arc<dyn PresenceStore>,
        mailer,
        NotifyConfig::default(),
    )
}

fn conversation() -> ConversationRef {
    ConversationRef::Assignment(AssignmentId::new())
}

#[tokio::test]
async fn test_one_email_per_offline_session_across_sign_ins() {
    let core = TestCore::new().await;
    let uid = UserId::new();
    seed_record(&core, uid, "student@example.edu").await;

    let mailer = Arc::new(RecordingMailer::default());
    let notifier = notifier_for(&core, Arc::clone(&mailer) as Arc<dyn Mailer>);
    let state = core.manager.state();

    // First offline period: five messages, one email.
    for _ in 0..5 {
        notifier.notify_if_offline(uid, "Prof. Lovelace", &conversation()).await;
    }
    assert_eq!(mailer.sent_count(), 1);

    // The recipient comes back online; the flag resets.
    core.sign_in(verified_identity(uid, "student@example.edu")).await;
    wait_until("session active", || state.phase() == SessionPhase::Active(uid)).await;

    // Messages while online never dispatch.
    notifier.notify_if_offline(uid, "Prof. Lovelace", &conversation()).await;
    assert_eq!(mailer.sent_count(), 1);

    // Second offline period: exactly one more email.
    core.sign_out_event().await;
    wait_until("signed out", || state.phase() == SessionPhase::SignedOut).await;
    wait_until_async("record offline", || async {
        core.record(uid).await.is_some_and(|record| !record.is_online)
    })
    .await;

    for _ in 0..3 {
        notifier.notify_if_offline(uid, "Prof. Lovelace", &conversation()).await;
    }
    assert_eq!(mailer.sent_count(), 2);
}

#[tokio::test]
async fn test_zero_calls_send_zero_emails() {
    let core = TestCore::new().await;
    seed_record(&core, UserId::new(), "student@example.edu").await;

    let mailer = Arc::new(RecordingMailer::default());
    let _notifier = notifier_for(&core, Arc::clone(&mailer) as Arc<dyn Mailer>);

    assert_eq!(mailer.sent_count(), 0);
}

#[tokio::test]
async fn test_single_call_sets_flag_and_dispatches_once() {
    let core = TestCore::new().await;
    let uid = UserId::new();
    seed_record(&core, uid, "student@example.edu").await;

    let mailer = Arc::new(RecordingMailer::default());
    let notifier = notifier_for(&core, Arc::clone(&mailer) as Arc<dyn Mailer>);

    notifier.notify_if_offline(uid, "Sam", &conversation()).await;

    assert_eq!(mailer.sent_count(), 1);
    let sent = mailer.sent.lock().unwrap();
    assert_eq!(sent[0].0, "student@example.edu");
    drop(sent);

    let record = core.record(uid).await.unwrap();
    assert!(record.notified_for_offline_message);
}

#[tokio::test]
async fn test_unconfigured_mailer_never_writes() {
    let core = TestCore::new().await;
    let uid = UserId::new();
    seed_record(&core, uid, "student@example.edu").await;

    // Default configuration selects the disabled backend.
    let mailer = build_mailer(&MailerConfig::default());
    let notifier = notifier_for(&core, mailer);

    notifier.notify_if_offline(uid, "Sam", &conversation()).await;

    let record = core.record(uid).await.unwrap();
    assert!(!record.notified_for_offline_message);
}
