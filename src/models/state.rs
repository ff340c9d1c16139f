//! Processing state tracked per notification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sentinel actor recorded when an acknowledgment reply already existed.
pub const PREVIOUSLY_ACKNOWLEDGED: &str = "previously_acknowledged";

/// Lifecycle status of a notification in the mapping store.
///
/// Only `Checked -> Processed` is a legal transition.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AckStatus {
    /// Seen, no qualifying reaction yet.
    Checked,
    /// Terminal: acknowledgment handled.
    Processed,
}

/// Mapping-store value keyed by notification id.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub struct ProcessingState {
    /// Ticket referenced by the notification.
    pub ticket_key: String,
    /// Current lifecycle status.
    pub status: AckStatus,
    /// Acknowledging actor, or [`PREVIOUSLY_ACKNOWLEDGED`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub acknowledged_by: Option<String>,
    /// Checked-at while pending, acknowledged-at once processed.
    pub event_time: DateTime<Utc>,
}

impl ProcessingState {
    /// First sighting of a notification without a qualifying reaction.
    #[must_use]
    pub fn checked(ticket_key: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            ticket_key: ticket_key.into(),
            status: AckStatus::Checked,
            acknowledged_by: None,
            event_time: at,
        }
    }

    /// Terminal state after an acknowledgment was handled.
    #[must_use]
    pub fn processed(
        ticket_key: impl Into<String>,
        acknowledged_by: impl Into<String>,
        at: DateTime<Utc>,
    ) -> Self {
        Self {
            ticket_key: ticket_key.into(),
            status: AckStatus::Processed,
            acknowledged_by: Some(acknowledged_by.into()),
            event_time: at,
        }
    }

    /// Whether the entry has reached the terminal state.
    #[must_use]
    pub fn is_processed(&self) -> bool {
        self.status == AckStatus::Processed
    }
}
