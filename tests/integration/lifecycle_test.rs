//! Integration tests for the session lifecycle manager.

use chrono::Utc;

use tutorlink_core::config::session::SessionConfig;
use tutorlink_core::types::id::UserId;
use tutorlink_entity::notification::NotificationEntry;
use tutorlink_entity::presence::{PresencePatch, UserRole};
use tutorlink_session::SessionPhase;
use tutorlink_store::traits::{NotificationStore, PresenceStore};

use crate::helpers::{TestCore, seed_record, verified_identity, wait_until, wait_until_async};

#[tokio::test]
async fn test_sign_in_goes_online_and_clears_notified_flag() {
    let core = TestCore::new().await;
    let uid = UserId::new();
    seed_record(&core, uid, "student@example.edu").await;

    // A previous offline period left the flag set.
    core.presence
        .merge(uid, PresencePatch::notified())
        .await
        .unwrap();

    core.sign_in(verified_identity(uid, "student@example.edu")).await;

    let state = core.manager.state();
    wait_until("session becomes active", || {
        state.phase() == SessionPhase::Active(uid)
    })
    .await;

    let record = core.record(uid).await.unwrap();
    assert!(record.is_online);
    assert!(!record.notified_for_offline_message);
}

#[tokio::test]
async fn test_projected_state_follows_store_updates() {
    let core = TestCore::new().await;
    let uid = UserId::new();
    seed_record(&core, uid, "student@example.edu").await;

    core.sign_in(verified_identity(uid, "student@example.edu")).await;

    let state = core.manager.state();
    wait_until("record projected", || {
        state.record().is_some_and(|record| record.is_online)
    })
    .await;

    core.feed
        .push(NotificationEntry::new(uid, "New bid", "/assignments", Utc::now()))
        .await
        .unwrap();

    wait_until("notification projected", || state.unread_count() == 1).await;
    assert_eq!(state.notifications()[0].message, "New bid");

    core.manager.mark_notifications_read().await.unwrap();
    wait_until("feed marked read", || state.unread_count() == 0).await;
}

#[tokio::test]
async fn test_identity_switch_moves_presence_and_subscriptions() {
    let core = TestCore::new().await;
    let uid1 = UserId::new();
    let uid2 = UserId::new();
    seed_record(&core, uid1, "first@example.edu").await;
    seed_record(&core, uid2, "second@example.edu").await;

    core.sign_in(verified_identity(uid1, "first@example.edu")).await;
    let state = core.manager.state();
    wait_until("first identity active", || {
        state.phase() == SessionPhase::Active(uid1)
    })
    .await;

    core.sign_in(verified_identity(uid2, "second@example.edu")).await;
    wait_until("second identity active", || {
        state.phase() == SessionPhase::Active(uid2)
    })
    .await;

    // The old identity's record eventually shows offline; the new one is
    // online with a clear notified flag.
    wait_until_async("first identity offline", || async {
        core.record(uid1).await.is_some_and(|record| !record.is_online)
    })
    .await;
    let record2 = core.record(uid2).await.unwrap();
    assert!(record2.is_online);
    assert!(!record2.notified_for_offline_message);

    // Nothing bound to the old identity is observable anymore: a fresh
    // entry in its feed never reaches the projected state.
    core.feed
        .push(NotificationEntry::new(uid1, "stale", "/assignments", Utc::now()))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(
        state
            .notifications()
            .iter()
            .all(|entry| entry.user_id == uid2),
        "old identity's feed must not be projected after the switch"
    );
}

#[tokio::test]
async fn test_sign_out_publishes_empty_state() {
    let core = TestCore::new().await;
    let uid = UserId::new();
    seed_record(&core, uid, "student@example.edu").await;

    core.sign_in(verified_identity(uid, "student@example.edu")).await;
    let state = core.manager.state();
    wait_until("session active", || state.phase() == SessionPhase::Active(uid)).await;

    core.manager.sign_out().await.unwrap();

    wait_until("signed out", || state.phase() == SessionPhase::SignedOut).await;
    assert!(state.record().is_none());
    assert!(state.notifications().is_empty());

    wait_until_async("record offline after sign-out", || async {
        core.record(uid).await.is_some_and(|record| !record.is_online)
    })
    .await;
}

#[tokio::test]
async fn test_shutdown_issues_best_effort_offline_write() {
    let core = TestCore::new().await;
    let uid = UserId::new();
    seed_record(&core, uid, "student@example.edu").await;

    core.sign_in(verified_identity(uid, "student@example.edu")).await;
    let state = core.manager.state();
    wait_until("session active", || state.phase() == SessionPhase::Active(uid)).await;

    core.manager.shutdown().await;

    let record = core.record(uid).await.unwrap();
    assert!(!record.is_online);
    assert_eq!(state.phase(), SessionPhase::SignedOut);
}

#[tokio::test]
async fn test_notified_flag_false_after_every_online_transition() {
    let core = TestCore::new().await;
    let uid = UserId::new();
    seed_record(&core, uid, "student@example.edu").await;
    let state = core.manager.state();

    for round in 0..3 {
        core.sign_in(verified_identity(uid, "student@example.edu")).await;
        wait_until("session active", || state.phase() == SessionPhase::Active(uid)).await;

        let record = core.record(uid).await.unwrap();
        assert!(
            !record.notified_for_offline_message,
            "flag must be clear right after online transition (round {round})"
        );

        core.sign_out_event().await;
        wait_until("signed out", || state.phase() == SessionPhase::SignedOut).await;
        wait_until_async("record offline", || async {
            core.record(uid).await.is_some_and(|record| !record.is_online)
        })
        .await;

        // A message arrives during the offline period and the throttle
        // marks it notified.
        core.presence
            .merge(uid, PresencePatch::notified())
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn test_bootstrap_identity_gets_privileged_record_exactly_once() {
    let config = SessionConfig {
        bootstrap_email: Some("admin@tutorlink.app".to_string()),
        ..SessionConfig::default()
    };
    let core = TestCore::with_config(config).await;
    let uid = UserId::new();

    core.sign_in(verified_identity(uid, "admin@tutorlink.app")).await;
    let state = core.manager.state();
    wait_until("bootstrap session active", || {
        state.phase() == SessionPhase::Active(uid)
    })
    .await;

    let record = core.record(uid).await.unwrap();
    assert_eq!(record.role, UserRole::Admin);
    assert_eq!(record.email, "admin@tutorlink.app");
    let created_at = record.created_at;

    // A second sign-in must not recreate or duplicate the record.
    core.sign_out_event().await;
    wait_until("signed out", || state.phase() == SessionPhase::SignedOut).await;
    core.sign_in(verified_identity(uid, "admin@tutorlink.app")).await;
    wait_until("second session active", || {
        state.phase() == SessionPhase::Active(uid)
    })
    .await;

    let record = core.record(uid).await.unwrap();
    assert_eq!(record.role, UserRole::Admin);
    assert_eq!(record.created_at, created_at);
}

#[tokio::test]
async fn test_non_bootstrap_identity_gets_sparse_record() {
    let core = TestCore::new().await;
    let uid = UserId::new();

    core.sign_in(verified_identity(uid, "student@example.edu")).await;
    let state = core.manager.state();
    wait_until("session active", || state.phase() == SessionPhase::Active(uid)).await;

    let record = core.record(uid).await.unwrap();
    assert_eq!(record.role, UserRole::Student);
    assert!(record.is_online);
    assert!(record.email.is_empty());
}
