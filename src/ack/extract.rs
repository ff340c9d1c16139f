//! Ticket key extraction from free-form notification text.
//!
//! Three encodings are tried in order, first match wins:
//! 1. the labelled Slack link `JIRA Ticket: <https://…/browse/KEY|KEY>`,
//! 2. any bare `KEY` token (`UPPERCASE-DIGITS`),
//! 3. a `…/browse/KEY` URL path segment.
//!
//! Keys are case-sensitive and not checked against a project list.

use std::sync::LazyLock;

use regex::Regex;

#[allow(clippy::expect_used)]
static LINKED_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"JIRA [Tt]icket:?\s*<[^>]*/([A-Z]+-\d+)\|[A-Z]+-\d+>").expect("static regex")
});

#[allow(clippy::expect_used)]
static BARE_KEY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([A-Z]+-\d+)").expect("static regex"));

#[allow(clippy::expect_used)]
static BROWSE_URL_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://[^/\s]*/browse/([A-Z]+-\d+)").expect("static regex")
});

#[allow(clippy::expect_used)]
static NOTIFICATION_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"JIRA [Tt]icket").expect("static regex"));

/// Whether a channel message announces a ticket at all.
///
/// Only marked messages are fed to [`extract_ticket_key`] by the sweep, so
/// unrelated chatter quoting `CVE-2024-…` style tokens never enters the store.
#[must_use]
pub fn is_ticket_notification(text: &str) -> bool {
    NOTIFICATION_MARKER.is_match(text)
}

/// Pull the first ticket key out of `text`.
#[must_use]
pub fn extract_ticket_key(text: &str) -> Option<String> {
    [&*LINKED_KEY, &*BARE_KEY, &*BROWSE_URL_KEY]
        .into_iter()
        .find_map(|pattern| pattern.captures(text))
        .and_then(|caps| caps.get(1))
        .map(|key| key.as_str().to_owned())
}
