//! Unit tests for advisory text cleanup.

use triage_relay::feed::text::{strip_html_tags, summarize, ticket_title, TITLE_MAX_CHARS};

#[test]
fn tags_are_removed() {
    assert_eq!(
        strip_html_tags("<p>Patch <b>now</b>.</p>"),
        "Patch now."
    );
}

#[test]
fn short_summary_is_trimmed_only() {
    assert_eq!(summarize("  brief note  "), "brief note");
}

#[test]
fn long_summary_cuts_at_late_sentence_end() {
    let text = format!("{}. {}", "a".repeat(450), "b".repeat(200));
    let summary = summarize(&text);
    assert_eq!(summary.chars().count(), 451);
    assert!(summary.ends_with('.'));
}

#[test]
fn long_summary_without_late_sentence_gets_ellipsis() {
    let text = format!("{}. {}", "a".repeat(100), "b".repeat(600));
    let summary = summarize(&text);
    assert_eq!(summary.chars().count(), 503);
    assert!(summary.ends_with("..."));
}

#[test]
fn title_within_limit_is_kept() {
    assert_eq!(ticket_title(" Router flaw "), "Router flaw");
}

#[test]
fn long_title_is_capped_with_ellipsis() {
    let title = ticket_title(&"x".repeat(300));
    assert_eq!(title.chars().count(), TITLE_MAX_CHARS);
    assert!(title.ends_with("..."));
}
