//! Global configuration parsing, validation, and credential loading.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::{AppError, Result};

/// Keyring service name under which credentials are stored.
const KEYRING_SERVICE: &str = "triage-relay";

/// Slack channel settings.
///
/// The bot token is loaded at runtime via OS keychain or environment
/// variable, never from the TOML config file.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct SlackConfig {
    /// Channel where advisory notifications are posted and swept.
    pub channel_id: String,
    /// Number of recent messages the sweep inspects.
    #[serde(default = "default_history_limit")]
    pub history_limit: u16,
    /// Bot user token used for all Web API calls (populated at runtime).
    #[serde(skip)]
    pub bot_token: String,
}

fn default_history_limit() -> u16 {
    100
}

/// Jira Cloud connectivity and workflow settings.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct JiraConfig {
    /// Site root, e.g. `https://example.atlassian.net`.
    pub base_url: String,
    /// Account email used for basic auth.
    pub email: String,
    /// Project that new advisory tickets are filed under.
    #[serde(default)]
    pub project_key: String,
    /// Parent epic for new advisory tickets.
    #[serde(default)]
    pub epic_key: String,
    /// Custom field that receives the triage-start timestamp.
    #[serde(default = "default_triage_field_id")]
    pub triage_field_id: String,
    /// Transition name applied once a ticket is acknowledged.
    #[serde(default = "default_in_progress_transition")]
    pub in_progress_transition: String,
    /// Issue type for new advisory tickets.
    #[serde(default = "default_issue_type")]
    pub issue_type: String,
    /// Priority for new advisory tickets.
    #[serde(default = "default_priority")]
    pub priority: String,
    /// Labels attached to new advisory tickets.
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
    /// API token paired with `email` (populated at runtime).
    #[serde(skip)]
    pub api_token: String,
}

fn default_triage_field_id() -> String {
    "customfield_10684".into()
}

fn default_in_progress_transition() -> String {
    "In Progress".into()
}

fn default_issue_type() -> String {
    "Sub-task".into()
}

fn default_priority() -> String {
    "Medium".into()
}

fn default_labels() -> Vec<String> {
    ["security-alert", "rss-feed", "cisa", "auto-generated", "cti"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Immediate-watch polling parameters.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct WatchConfig {
    /// Delay between reaction checks.
    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u64,
    /// Upper bound on how long a fresh notification is watched.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_interval_seconds() -> u64 {
    5
}

fn default_timeout_seconds() -> u64 {
    60
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_seconds: default_interval_seconds(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl WatchConfig {
    /// Polling interval as a [`Duration`].
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_seconds)
    }

    /// Watch timeout as a [`Duration`].
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

/// Advisory relevance keywords and notification labelling.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct FeedConfig {
    /// Label shown at the top of each notification.
    #[serde(default = "default_source_name")]
    pub source_name: String,
    /// Products and services in use by the organisation.
    #[serde(default)]
    pub product_keywords: Vec<String>,
    /// Vulnerability and incident terms.
    #[serde(default)]
    pub threat_keywords: Vec<String>,
    /// Customers, sectors, and other organisation-specific terms.
    #[serde(default)]
    pub other_keywords: Vec<String>,
    /// Entries whose link contains any of these fragments are dropped.
    #[serde(default = "default_excluded_link_fragments")]
    pub excluded_link_fragments: Vec<String>,
    /// Upstream feed the entries came from; the curated feed's channel link.
    #[serde(default = "default_source_url")]
    pub source_url: String,
    /// Where the curated RSS document is written.
    #[serde(default = "default_curated_feed_path")]
    pub curated_feed_path: PathBuf,
    /// Channel title of the curated feed.
    #[serde(default = "default_curated_title")]
    pub curated_title: String,
    /// Channel description of the curated feed.
    #[serde(default = "default_curated_description")]
    pub curated_description: String,
}

fn default_source_name() -> String {
    "CISA".into()
}

fn default_excluded_link_fragments() -> Vec<String> {
    vec!["/ics".into()]
}

fn default_source_url() -> String {
    "https://www.cisa.gov/cybersecurity-advisories/all.xml".into()
}

fn default_curated_feed_path() -> PathBuf {
    PathBuf::from("feeds/curated-advisories.xml")
}

fn default_curated_title() -> String {
    "Filtered - CISA Advisories".into()
}

fn default_curated_description() -> String {
    "Filtered CISA advisories for organisation-relevant threats".into()
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            source_name: default_source_name(),
            product_keywords: Vec::new(),
            threat_keywords: Vec::new(),
            other_keywords: Vec::new(),
            excluded_link_fragments: default_excluded_link_fragments(),
            source_url: default_source_url(),
            curated_feed_path: default_curated_feed_path(),
            curated_title: default_curated_title(),
            curated_description: default_curated_description(),
        }
    }
}

fn default_state_path() -> PathBuf {
    PathBuf::from(".triage_relay_state.json")
}

fn default_seen_cache_path() -> PathBuf {
    PathBuf::from(".seen_entries.json")
}

fn default_retention_hours() -> u32 {
    24
}

/// Global configuration parsed from `config.toml`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct GlobalConfig {
    /// Notification-to-ticket mapping file.
    ///
    /// Records are `{ticket_key, status, acknowledged_by?, event_time}`
    /// keyed by message `ts`. Files from the older `processed` /
    /// `checked_at` layout are not readable and fail the run with a
    /// `Store` error; point this at a fresh path when migrating.
    #[serde(default = "default_state_path")]
    pub state_path: PathBuf,
    /// Previously seen advisory links.
    #[serde(default = "default_seen_cache_path")]
    pub seen_cache_path: PathBuf,
    /// Hours a mapping entry is kept after its last state change.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u32,
    /// Slack channel settings.
    pub slack: SlackConfig,
    /// Jira settings.
    pub jira: JiraConfig,
    /// Immediate-watch polling parameters.
    #[serde(default)]
    pub watch: WatchConfig,
    /// Advisory relevance settings.
    #[serde(default)]
    pub feed: FeedConfig,
}

impl GlobalConfig {
    /// Load and validate configuration from a TOML file path.
    ///
    /// Relative state paths are resolved against the directory holding the
    /// config file.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if the file cannot be read or contains
    /// invalid TOML, or if validation fails.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)
            .map_err(|err| AppError::Config(format!("failed to read config: {err}")))?;
        let mut config = Self::from_toml_str(&raw)?;
        if let Some(dir) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            config.resolve_paths(dir);
        }
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if parsing or validation fails.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Load Slack and Jira secrets from OS keychain with env-var fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if neither keychain nor env vars provide
    /// a required secret.
    pub fn load_credentials(&mut self) -> Result<()> {
        self.slack.bot_token = load_credential("slack_bot_token", "SLACK_BOT_TOKEN")?;
        self.jira.api_token = load_credential("jira_api_token", "JIRA_API_TOKEN")?;
        Ok(())
    }

    /// Retention window for mapping entries.
    #[must_use]
    pub fn retention(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.retention_hours))
    }

    fn resolve_paths(&mut self, base: &Path) {
        if self.state_path.is_relative() {
            self.state_path = base.join(&self.state_path);
        }
        if self.seen_cache_path.is_relative() {
            self.seen_cache_path = base.join(&self.seen_cache_path);
        }
        if self.feed.curated_feed_path.is_relative() {
            self.feed.curated_feed_path = base.join(&self.feed.curated_feed_path);
        }
    }

    fn validate(&self) -> Result<()> {
        if self.slack.channel_id.trim().is_empty() {
            return Err(AppError::Config("slack.channel_id must not be empty".into()));
        }

        if self.slack.history_limit == 0 {
            return Err(AppError::Config(
                "slack.history_limit must be greater than zero".into(),
            ));
        }

        if self.jira.base_url.trim().is_empty() {
            return Err(AppError::Config("jira.base_url must not be empty".into()));
        }

        if self.jira.email.trim().is_empty() {
            return Err(AppError::Config("jira.email must not be empty".into()));
        }

        if self.watch.interval_seconds == 0 {
            return Err(AppError::Config(
                "watch.interval_seconds must be greater than zero".into(),
            ));
        }

        Ok(())
    }
}

/// Load a single credential from OS keychain with env-var fallback.
fn load_credential(keyring_key: &str, env_key: &str) -> Result<String> {
    let keychain_result =
        keyring::Entry::new(KEYRING_SERVICE, keyring_key).and_then(|entry| entry.get_password());

    match keychain_result {
        Ok(value) if !value.is_empty() => return Ok(value),
        Ok(_) => {
            warn!(key = keyring_key, "keychain entry is empty, trying env var");
        }
        Err(err) => {
            warn!(
                key = keyring_key,
                ?err,
                "keychain lookup failed, trying env var"
            );
        }
    }

    match env::var(env_key) {
        Ok(value) if !value.is_empty() => Ok(value),
        _ => Err(AppError::Config(format!(
            "credential {keyring_key} not found in keychain or {env_key} env var"
        ))),
    }
}
