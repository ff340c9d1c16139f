//! Integration tests for the immediate watch on a fresh notification.

use std::time::Duration;

use chrono::Utc;

use triage_relay::ack::poll::{self, WatchOptions, WatchOutcome};
use triage_relay::models::chat::Reaction;
use triage_relay::models::state::ProcessingState;

use super::test_helpers::Harness;

fn quick(timeout_ms: u64) -> WatchOptions {
    WatchOptions {
        interval: Duration::from_millis(10),
        timeout: Duration::from_millis(timeout_ms),
    }
}

#[tokio::test]
async fn reaction_during_watch_runs_workflow() {
    let h = Harness::new();
    h.chat.state.lock().unwrap().delayed_reactions.insert(
        "9.1".into(),
        (3, vec![Reaction::new("+1", &["U9"])]),
    );

    let outcome = poll::watch(&h.reconciler(), &h.store, "9.1", "SEC-9", quick(5_000))
        .await
        .unwrap();

    assert_eq!(outcome, WatchOutcome::Acknowledged { actor: "U9".into() });
    assert_eq!(h.chat.reaction_calls("9.1"), 3);
    assert_eq!(h.actuations().len(), 4);
    let saved = h.store.load().unwrap();
    let entry = saved.get("9.1").unwrap();
    assert!(entry.is_processed());
    assert_eq!(entry.ticket_key, "SEC-9");
}

#[tokio::test]
async fn timeout_leaves_store_untouched() {
    let h = Harness::new();

    let outcome = poll::watch(&h.reconciler(), &h.store, "9.2", "SEC-9", quick(60))
        .await
        .unwrap();

    assert_eq!(outcome, WatchOutcome::TimedOut);
    assert!(h.chat.reaction_calls("9.2") >= 1);
    assert!(!h.store.path().exists(), "watch must not write on timeout");
    assert!(h.actuations().is_empty());
}

#[tokio::test]
async fn processed_notification_returns_immediately() {
    let h = Harness::new();
    let mut seeded = h.store.load().unwrap();
    seeded.upsert("9.3", ProcessingState::processed("SEC-9", "U4", Utc::now()));
    h.store.save(&seeded).unwrap();

    let outcome = poll::watch(&h.reconciler(), &h.store, "9.3", "SEC-9", quick(5_000))
        .await
        .unwrap();

    assert_eq!(outcome, WatchOutcome::AlreadyProcessed);
    assert_eq!(h.chat.reaction_calls("9.3"), 0);
}

#[tokio::test]
async fn reaction_failures_are_retried_until_timeout() {
    let h = Harness::new();
    h.chat.state.lock().unwrap().fail_reactions = true;

    let outcome = poll::watch(&h.reconciler(), &h.store, "9.4", "SEC-9", quick(60))
        .await
        .unwrap();

    assert_eq!(outcome, WatchOutcome::TimedOut);
    assert!(h.chat.reaction_calls("9.4") > 1);
}
