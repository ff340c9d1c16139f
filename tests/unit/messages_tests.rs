//! Unit tests for notification and reply text templates.

use triage_relay::ack::extract::{extract_ticket_key, is_ticket_notification};
use triage_relay::models::advisory::Advisory;
use triage_relay::slack::messages::{
    acknowledgment_reply, advisory_notification, is_acknowledgment_reply, ticket_url,
};

#[test]
fn reply_mentions_actor_and_is_recognized() {
    let reply = acknowledgment_reply("U9");
    assert_eq!(reply, "Under review and acknowledged by <@U9> :white_check_mark:");
    assert!(is_acknowledgment_reply(&reply));
    assert!(!is_acknowledgment_reply("looking into it"));
}

#[test]
fn ticket_url_tolerates_trailing_slash() {
    assert_eq!(ticket_url("https://x/", "ABC-1"), "https://x/browse/ABC-1");
    assert_eq!(ticket_url("https://x", "ABC-1"), "https://x/browse/ABC-1");
}

#[test]
fn notification_round_trips_through_extractor() {
    let advisory = Advisory {
        title: "Router flaw".into(),
        link: "https://feed.example/a/1".into(),
        description: String::new(),
        published: String::new(),
    };
    let text = advisory_notification("CISA", &advisory, "https://x", Some("SEC-12"));

    assert!(text.contains("CISA"));
    assert!(text.contains("Title: Router flaw"));
    assert!(is_ticket_notification(&text));
    assert_eq!(extract_ticket_key(&text).as_deref(), Some("SEC-12"));
}

#[test]
fn notification_without_ticket_has_no_marker() {
    let advisory = Advisory {
        title: "Router flaw".into(),
        link: "https://feed.example/a/1".into(),
        description: String::new(),
        published: String::new(),
    };
    let text = advisory_notification("CISA", &advisory, "https://x", None);
    assert!(!is_ticket_notification(&text));
}
