//! Text templates for notifications and acknowledgment replies.

use crate::models::advisory::Advisory;

/// Fixed prefix of every acknowledgment confirmation reply.
pub const ACK_REPLY_MARKER: &str = "Under review and acknowledged by";

/// Confirmation posted in-thread once an actor acknowledges a ticket.
#[must_use]
pub fn acknowledgment_reply(actor_id: &str) -> String {
    format!("{ACK_REPLY_MARKER} <@{actor_id}> :white_check_mark:")
}

/// Whether a thread reply is an acknowledgment confirmation.
#[must_use]
pub fn is_acknowledgment_reply(text: &str) -> bool {
    text.contains(ACK_REPLY_MARKER)
}

/// Browse URL for a ticket on the tracker site.
#[must_use]
pub fn ticket_url(base_url: &str, ticket_key: &str) -> String {
    format!("{}/browse/{ticket_key}", base_url.trim_end_matches('/'))
}

/// Channel notification for a new advisory.
///
/// The ticket line uses Slack link syntax so the key is both the link
/// text and the tail of the link target.
#[must_use]
pub fn advisory_notification(
    source_name: &str,
    advisory: &Advisory,
    base_url: &str,
    ticket_key: Option<&str>,
) -> String {
    let mut lines = vec![
        format!("\u{1f6e1}\u{fe0f} {source_name}"),
        format!("Title: {}", advisory.title),
    ];
    if let Some(key) = ticket_key {
        lines.push(format!("JIRA Ticket: <{}|{key}>", ticket_url(base_url, key)));
    }
    lines.join("\n")
}
