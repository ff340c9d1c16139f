//! Unit tests for create-issue payloads.

use triage_relay::config::GlobalConfig;
use triage_relay::jira::issue::{description_document, new_issue_fields};
use triage_relay::models::advisory::Advisory;

fn config(epic: &str) -> GlobalConfig {
    let raw = format!(
        r#"
[slack]
channel_id = "C1"

[jira]
base_url = "https://example.atlassian.net"
email = "bot@example.com"
project_key = "SEC"
epic_key = "{epic}"

[feed]
product_keywords = ["Acme Router"]
threat_keywords = ["exploit"]
"#
    );
    GlobalConfig::from_toml_str(&raw).expect("config parses")
}

fn advisory() -> Advisory {
    Advisory {
        title: "Acme Router exploit in the wild".into(),
        link: "https://feed.example/alerts/aa24-9".into(),
        description: "<p>Attackers exploit Acme Router.</p>".into(),
        published: "Mon, 07 Oct 2024".into(),
    }
}

#[test]
fn fields_carry_project_type_priority_and_parent() {
    let config = config("SEC-1");
    let fields = new_issue_fields(&config.jira, &config.feed, &advisory());

    assert_eq!(fields["project"]["key"], "SEC");
    assert_eq!(fields["summary"], "Acme Router exploit in the wild");
    assert_eq!(fields["issuetype"]["name"], "Sub-task");
    assert_eq!(fields["priority"]["name"], "Medium");
    assert_eq!(fields["parent"]["key"], "SEC-1");
    assert!(fields["labels"].as_array().is_some_and(|labels| !labels.is_empty()));
}

#[test]
fn parent_omitted_without_epic() {
    let config = config("");
    let fields = new_issue_fields(&config.jira, &config.feed, &advisory());
    assert!(fields.get("parent").is_none());
}

#[test]
fn description_is_adf_with_clean_summary_and_keywords() {
    let config = config("SEC-1");
    let doc = description_document(&config.feed, &advisory());

    assert_eq!(doc["type"], "doc");
    assert_eq!(doc["version"], 1);
    let rendered = doc.to_string();
    assert!(rendered.contains("Attackers exploit Acme Router."));
    assert!(!rendered.contains("<p>"));
    assert!(rendered.contains("Link: https://feed.example/alerts/aa24-9"));
    assert!(rendered.contains("Acme Router"));
}
