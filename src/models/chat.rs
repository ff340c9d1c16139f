//! Chat-side entities: posted messages, reactions, and actor profiles.

use serde::{Deserialize, Serialize};

/// Display name used when the chat backend returns none.
pub const UNKNOWN_USER: &str = "unknown user";

/// A message read back from the notification channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Backend-assigned message id (Slack `ts`); ordered by post time.
    pub id: String,
    /// Raw message text; empty when the backend returned none.
    #[serde(default)]
    pub text: String,
}

impl ChatMessage {
    /// Construct a message from its id and text.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
        }
    }
}

/// One emoji reaction and the actors who applied it, in backend order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reaction {
    /// Reaction name, e.g. `+1` or `thumbsup::skin-tone-3`.
    pub name: String,
    /// Actor ids in the order the backend reports them.
    #[serde(default)]
    pub actors: Vec<String>,
}

impl Reaction {
    /// Construct a reaction record.
    #[must_use]
    pub fn new(name: impl Into<String>, actors: &[&str]) -> Self {
        Self {
            name: name.into(),
            actors: actors.iter().map(|actor| (*actor).to_owned()).collect(),
        }
    }
}

/// Profile details needed to map a chat actor onto a tracker account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorProfile {
    /// Human-readable name; [`UNKNOWN_USER`] when absent.
    #[serde(default = "unknown_user")]
    pub display_name: String,
    /// Contact email used for account lookup.
    #[serde(default)]
    pub contact_email: Option<String>,
}

fn unknown_user() -> String {
    UNKNOWN_USER.into()
}

impl Default for ActorProfile {
    fn default() -> Self {
        Self {
            display_name: unknown_user(),
            contact_email: None,
        }
    }
}
