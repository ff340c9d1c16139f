//! Create-issue payloads for advisory tickets.
//!
//! Descriptions use the Atlassian document format (ADF) expected by the
//! v3 REST API.

use chrono::Local;
use serde_json::{json, Value};

use crate::config::{FeedConfig, JiraConfig};
use crate::feed::relevance::KeywordMatches;
use crate::feed::text;
use crate::models::advisory::Advisory;

fn text_node(text: impl Into<String>) -> Value {
    json!({ "type": "text", "text": text.into() })
}

fn heading(level: u8, text: &str) -> Value {
    json!({ "type": "heading", "attrs": { "level": level }, "content": [text_node(text)] })
}

fn paragraph(content: Vec<Value>) -> Value {
    json!({ "type": "paragraph", "content": content })
}

fn hard_break() -> Value {
    json!({ "type": "hardBreak" })
}

/// ADF description body for an advisory ticket.
#[must_use]
pub fn description_document(feed: &FeedConfig, advisory: &Advisory) -> Value {
    let clean = text::strip_html_tags(&advisory.description);
    let matches = KeywordMatches::scan(
        feed,
        &format!("{} {clean}", advisory.title).to_lowercase(),
    );
    let footer = format!(
        "This ticket was automatically created by the advisory relay on {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    json!({
        "version": 1,
        "type": "doc",
        "content": [
            heading(2, "Security Alert Details"),
            paragraph(vec![
                text_node(format!("Source: {} Advisories Feed", feed.source_name)),
                hard_break(),
                text_node(format!("Published: {}", advisory.published)),
                hard_break(),
                text_node(format!("Link: {}", advisory.link)),
            ]),
            heading(3, "Summary"),
            paragraph(vec![text_node(text::summarize(&clean))]),
            heading(3, "Keywords Detected"),
            paragraph(vec![
                text_node("Products: "),
                text_node(matches.products.join(", ")),
            ]),
            paragraph(vec![
                text_node("Threats: "),
                text_node(matches.threats.join(", ")),
            ]),
            heading(3, "Customers: "),
            paragraph(vec![text_node(matches.others.join(", "))]),
            heading(3, "Action Required"),
            paragraph(vec![text_node(
                "Please review this security alert and determine if any action is required for our environment.",
            )]),
            paragraph(vec![text_node("---"), hard_break(), text_node(footer)]),
        ]
    })
}

/// The `fields` object for creating an advisory ticket.
#[must_use]
pub fn new_issue_fields(jira: &JiraConfig, feed: &FeedConfig, advisory: &Advisory) -> Value {
    let mut fields = json!({
        "project": { "key": jira.project_key },
        "summary": text::ticket_title(&advisory.title),
        "description": description_document(feed, advisory),
        "issuetype": { "name": jira.issue_type },
        "priority": { "name": jira.priority },
        "labels": jira.labels,
    });
    if !jira.epic_key.is_empty() {
        fields["parent"] = json!({ "key": jira.epic_key });
    }
    fields
}
