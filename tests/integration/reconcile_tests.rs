//! Integration tests for the per-notification reconciliation state machine.
//!
//! Validates:
//! - A fresh thumbs-up runs reply, assign, stamp, transition in order
//! - Reconciling twice actuates once
//! - An existing confirmation reply short-circuits without actuation
//! - Pending notifications are recorded once and not refreshed
//! - Individual action failures never block the remaining steps

use chrono::{Duration, Utc};

use triage_relay::ack::actuator::ActuationReport;
use triage_relay::ack::reconcile::Outcome;
use triage_relay::models::chat::{ChatMessage, Reaction};
use triage_relay::models::state::{AckStatus, PREVIOUSLY_ACKNOWLEDGED};
use triage_relay::models::ticket::Transition;
use triage_relay::persistence::mapping_store::Mapping;

use super::test_helpers::Harness;

const LINKED: &str = "JIRA Ticket: <https://x/browse/ABC-1|ABC-1>";

fn notification() -> ChatMessage {
    ChatMessage::new("1700000000.000100", LINKED)
}

#[tokio::test]
async fn thumbs_up_runs_full_actuation_sequence() {
    let h = Harness::new();
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U9"])]);
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    assert_eq!(
        outcome,
        Outcome::Acknowledged {
            actor: "U9".into(),
            report: ActuationReport {
                replied: true,
                assigned: true,
                stamped: true,
                transitioned: true,
            },
        }
    );
    assert_eq!(
        h.actuations(),
        vec![
            "reply:1700000000.000100:Under review and acknowledged by <@U9> :white_check_mark:"
                .to_owned(),
            "assign:ABC-1:acc-nina".to_owned(),
            "stamp:ABC-1:customfield_10684".to_owned(),
            "transition:ABC-1:21".to_owned(),
        ]
    );

    let entry = mapping.get("1700000000.000100").expect("entry recorded");
    assert_eq!(entry.ticket_key, "ABC-1");
    assert_eq!(entry.status, AckStatus::Processed);
    assert_eq!(entry.acknowledged_by.as_deref(), Some("U9"));
}

#[tokio::test]
async fn stamp_value_is_rfc3339_utc() {
    let h = Harness::new();
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("thumbsup", &["U9"])]);
    let mut mapping = Mapping::default();

    h.reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    let fields = &h.tickets.state.lock().unwrap().fields;
    let value = fields
        .get(&("ABC-1".to_owned(), "customfield_10684".to_owned()))
        .and_then(|value| value.as_str())
        .expect("stamp written");
    assert!(chrono::DateTime::parse_from_rfc3339(value).is_ok(), "{value}");
    assert!(value.ends_with('Z'));
}

#[tokio::test]
async fn reconciling_twice_actuates_once() {
    let h = Harness::new();
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U9"])]);
    let mut mapping = Mapping::default();
    let reconciler = h.reconciler();

    let first = reconciler
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;
    let second = reconciler
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    assert!(matches!(first, Outcome::Acknowledged { .. }));
    assert_eq!(second, Outcome::Skipped);
    assert_eq!(h.actuations().len(), 4);
}

#[tokio::test]
async fn existing_confirmation_reply_short_circuits() {
    let h = Harness::new();
    h.chat.add_reply(
        "1700000000.000100",
        "Under review and acknowledged by <@U2> :white_check_mark:",
    );
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U9"])]);
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    assert_eq!(outcome, Outcome::PreviouslyAcknowledged);
    assert!(h.actuations().is_empty(), "no workflow actions expected");
    let entry = mapping.get("1700000000.000100").unwrap();
    assert!(entry.is_processed());
    assert_eq!(
        entry.acknowledged_by.as_deref(),
        Some(PREVIOUSLY_ACKNOWLEDGED)
    );
}

#[tokio::test]
async fn pending_notification_recorded_once_without_refresh() {
    let h = Harness::new();
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("eyes", &["U3"])]);
    let mut mapping = Mapping::default();
    let reconciler = h.reconciler();
    let first_seen = Utc::now() - Duration::hours(2);

    let first = reconciler
        .reconcile(&notification(), &mut mapping, first_seen)
        .await;
    let second = reconciler
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    assert_eq!(first, Outcome::FirstSighting);
    assert_eq!(second, Outcome::StillPending);
    let entry = mapping.get("1700000000.000100").unwrap();
    assert_eq!(entry.status, AckStatus::Checked);
    assert_eq!(entry.event_time, first_seen);
    assert!(h.actuations().is_empty());
}

#[tokio::test]
async fn checked_entry_promoted_when_reaction_arrives() {
    let h = Harness::new();
    let mut mapping = Mapping::default();
    let reconciler = h.reconciler();

    reconciler
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U9"])]);
    let outcome = reconciler
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    assert!(matches!(outcome, Outcome::Acknowledged { ref actor, .. } if actor == "U9"));
    assert!(mapping.get("1700000000.000100").unwrap().is_processed());
}

#[tokio::test]
async fn text_without_ticket_key_is_ignored() {
    let h = Harness::new();
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(
            &ChatMessage::new("1700000000.000200", "JIRA ticket to follow"),
            &mut mapping,
            Utc::now(),
        )
        .await;

    assert_eq!(outcome, Outcome::Ignored);
    assert!(mapping.is_empty());
    assert_eq!(h.chat.reaction_calls("1700000000.000200"), 0);
}

#[tokio::test]
async fn unassignable_actor_does_not_block_remaining_steps() {
    let h = Harness::new();
    h.chat.set_profile("U7", "sam", None);
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U7"])]);
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    let Outcome::Acknowledged { report, .. } = outcome else {
        panic!("expected acknowledgment, got {outcome:?}");
    };
    assert!(report.replied);
    assert!(!report.assigned);
    assert!(report.stamped);
    assert!(report.transitioned);
    assert!(mapping.get("1700000000.000100").unwrap().is_processed());
}

#[tokio::test]
async fn unknown_actor_profile_does_not_block_remaining_steps() {
    let h = Harness::new();
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U404"])]);
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    let Outcome::Acknowledged { report, .. } = outcome else {
        panic!("expected acknowledgment, got {outcome:?}");
    };
    assert!(!report.assigned);
    assert!(report.stamped && report.transitioned);
}

#[tokio::test]
async fn failed_assignment_still_marks_processed() {
    let h = Harness::new();
    h.tickets.state.lock().unwrap().fail_assign = true;
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U9"])]);
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    let Outcome::Acknowledged { report, .. } = outcome else {
        panic!("expected acknowledgment, got {outcome:?}");
    };
    assert!(!report.assigned);
    assert!(mapping.get("1700000000.000100").unwrap().is_processed());
}

#[tokio::test]
async fn missing_in_progress_transition_is_logged_not_fatal() {
    let h = Harness::new();
    h.tickets.state.lock().unwrap().transitions = vec![Transition {
        id: "31".into(),
        name: "Done".into(),
    }];
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U9"])]);
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    let Outcome::Acknowledged { report, .. } = outcome else {
        panic!("expected acknowledgment, got {outcome:?}");
    };
    assert!(!report.transitioned);
    assert!(!h.actuations().iter().any(|e| e.starts_with("transition:")));
}

#[tokio::test]
async fn transition_name_match_ignores_case() {
    let h = Harness::new();
    h.tickets.state.lock().unwrap().transitions = vec![Transition {
        id: "41".into(),
        name: "IN PROGRESS".into(),
    }];
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U9"])]);
    let mut mapping = Mapping::default();

    h.reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    assert!(h.actuations().contains(&"transition:ABC-1:41".to_owned()));
}

#[tokio::test]
async fn failed_reaction_lookup_does_not_mark_processed() {
    let h = Harness::new();
    h.chat.state.lock().unwrap().fail_reactions = true;
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    assert_eq!(outcome, Outcome::FirstSighting);
    assert_eq!(
        mapping.get("1700000000.000100").unwrap().status,
        AckStatus::Checked
    );
    assert!(h.actuations().is_empty());
}

#[tokio::test]
async fn failed_reply_lookup_falls_through_to_reactions() {
    let h = Harness::new();
    h.chat.state.lock().unwrap().fail_replies = true;
    h.chat
        .set_reactions("1700000000.000100", vec![Reaction::new("+1", &["U9"])]);
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    assert!(matches!(outcome, Outcome::Acknowledged { .. }));
}

#[tokio::test]
async fn first_thumbs_variant_wins_over_other_reactions() {
    let h = Harness::new();
    h.chat.set_profile("U1", "ana", Some("ana@example.com"));
    h.chat.set_reactions(
        "1700000000.000100",
        vec![
            Reaction::new("eyes", &["U5"]),
            Reaction::new("thumbsup", &["U1", "U2"]),
        ],
    );
    let mut mapping = Mapping::default();

    let outcome = h
        .reconciler()
        .reconcile(&notification(), &mut mapping, Utc::now())
        .await;

    assert!(matches!(outcome, Outcome::Acknowledged { ref actor, .. } if actor == "U1"));
    assert_eq!(
        mapping
            .get("1700000000.000100")
            .unwrap()
            .acknowledged_by
            .as_deref(),
        Some("U1")
    );
}
