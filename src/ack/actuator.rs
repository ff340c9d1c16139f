//! Side effects applied once a notification is acknowledged.
//!
//! The four steps run in a fixed order and are independent: a failure is
//! logged and the next step still runs. Nothing is rolled back or retried.

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::backend::{ChatBackend, TicketBackend};
use crate::config::JiraConfig;
use crate::slack::messages;
use crate::Result;

/// Which actuation steps succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActuationReport {
    /// Confirmation reply posted in the notification thread.
    pub replied: bool,
    /// Ticket assigned to the acknowledging actor.
    pub assigned: bool,
    /// Triage-start timestamp written.
    pub stamped: bool,
    /// Ticket moved to the in-progress state.
    pub transitioned: bool,
}

/// Workflow actions against the chat and ticket backends.
pub struct WorkflowActuator<'a> {
    chat: &'a dyn ChatBackend,
    tickets: &'a dyn TicketBackend,
    jira: &'a JiraConfig,
}

impl<'a> WorkflowActuator<'a> {
    /// Bind the actuator to its backends and workflow settings.
    #[must_use]
    pub fn new(
        chat: &'a dyn ChatBackend,
        tickets: &'a dyn TicketBackend,
        jira: &'a JiraConfig,
    ) -> Self {
        Self {
            chat,
            tickets,
            jira,
        }
    }

    /// Run reply, assign, stamp, and transition in that order.
    pub async fn actuate(
        &self,
        notification_id: &str,
        ticket_key: &str,
        actor_id: &str,
        now: DateTime<Utc>,
    ) -> ActuationReport {
        let report = ActuationReport {
            replied: self
                .reply_in_thread(notification_id, &messages::acknowledgment_reply(actor_id))
                .await,
            assigned: self.assign(ticket_key, actor_id).await,
            stamped: self.stamp_triage_start(ticket_key, now).await,
            transitioned: self.transition_to_in_progress(ticket_key).await,
        };
        info!(ticket_key, actor = actor_id, ?report, "actuation finished");
        report
    }

    /// Post a threaded reply under the notification.
    pub async fn reply_in_thread(&self, notification_id: &str, text: &str) -> bool {
        log_outcome(
            "reply",
            notification_id,
            self.chat.post_reply(notification_id, text).await,
        )
    }

    /// Assign the ticket to the account matching the actor's contact email.
    ///
    /// Resolution failures are logged and leave the ticket unassigned.
    pub async fn assign(&self, ticket_key: &str, actor_id: &str) -> bool {
        let profile = match self.chat.resolve_actor_profile(actor_id).await {
            Ok(profile) => profile,
            Err(err) => {
                warn!(ticket_key, actor = actor_id, %err, "could not resolve actor profile");
                return false;
            }
        };

        let Some(email) = profile.contact_email.as_deref() else {
            warn!(
                ticket_key,
                actor = actor_id,
                user = %profile.display_name,
                "actor has no contact email; leaving ticket unassigned"
            );
            return false;
        };

        let account_id = match self.tickets.find_account_by_email(email).await {
            Ok(Some(account_id)) => account_id,
            Ok(None) => {
                warn!(ticket_key, email, "no tracker account for email");
                return false;
            }
            Err(err) => {
                warn!(ticket_key, email, %err, "tracker account lookup failed");
                return false;
            }
        };

        log_outcome(
            "assign",
            ticket_key,
            self.tickets.set_assignee(ticket_key, &account_id).await,
        )
    }

    /// Write the triage-start timestamp field.
    pub async fn stamp_triage_start(&self, ticket_key: &str, at: DateTime<Utc>) -> bool {
        let value = Value::String(at.to_rfc3339_opts(SecondsFormat::Millis, true));
        log_outcome(
            "stamp triage start",
            ticket_key,
            self.tickets
                .set_custom_field(ticket_key, &self.jira.triage_field_id, value)
                .await,
        )
    }

    /// Apply the configured in-progress transition if the ticket offers it.
    pub async fn transition_to_in_progress(&self, ticket_key: &str) -> bool {
        let transitions = match self.tickets.list_transitions(ticket_key).await {
            Ok(transitions) => transitions,
            Err(err) => {
                error!(ticket_key, %err, "failed to list transitions");
                return false;
            }
        };

        let wanted = &self.jira.in_progress_transition;
        let Some(transition) = transitions
            .iter()
            .find(|transition| transition.name.eq_ignore_ascii_case(wanted))
        else {
            warn!(ticket_key, transition = %wanted, "transition not available for ticket");
            return false;
        };

        log_outcome(
            "transition",
            ticket_key,
            self.tickets
                .apply_transition(ticket_key, &transition.id)
                .await,
        )
    }
}

fn log_outcome<T>(action: &str, target: &str, outcome: Result<T>) -> bool {
    match outcome {
        Ok(_) => {
            info!(action, target, "workflow action applied");
            true
        }
        Err(err) => {
            error!(action, target, %err, "workflow action failed");
            false
        }
    }
}
