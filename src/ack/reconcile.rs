//! Per-notification acknowledgment state machine.
//!
//! `UNSEEN -> CHECKED -> PROCESSED`, driven by the mapping store. A
//! `processed` entry is the only guard against repeated actuation, so the
//! store must have a single writer at a time.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use crate::ack::actuator::{ActuationReport, WorkflowActuator};
use crate::ack::{extract, reaction};
use crate::backend::ChatBackend;
use crate::models::chat::ChatMessage;
use crate::models::state::{ProcessingState, PREVIOUSLY_ACKNOWLEDGED};
use crate::persistence::mapping_store::Mapping;
use crate::slack::messages;

/// Result of reconciling one notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No ticket key in the text; not a ticket notification.
    Ignored,
    /// Already `processed`; nothing done.
    Skipped,
    /// The thread already holds a confirmation reply; marked `processed`
    /// without actuation.
    PreviouslyAcknowledged,
    /// A qualifying reaction was found and the workflow ran.
    Acknowledged {
        /// Acting user.
        actor: String,
        /// Per-step results.
        report: ActuationReport,
    },
    /// No qualifying reaction; recorded as `checked` for the first time.
    FirstSighting,
    /// No qualifying reaction; existing `checked` entry left untouched.
    StillPending,
}

/// Decides skip / watch / finalize for notifications and drives actuation.
pub struct Reconciler<'a> {
    chat: &'a dyn ChatBackend,
    actuator: WorkflowActuator<'a>,
}

impl<'a> Reconciler<'a> {
    /// Bind the engine to the chat backend and an actuator.
    #[must_use]
    pub fn new(chat: &'a dyn ChatBackend, actuator: WorkflowActuator<'a>) -> Self {
        Self { chat, actuator }
    }

    /// Run one pass of the state machine for `notification`.
    pub async fn reconcile(
        &self,
        notification: &ChatMessage,
        mapping: &mut Mapping,
        now: DateTime<Utc>,
    ) -> Outcome {
        let Some(ticket_key) = extract::extract_ticket_key(&notification.text) else {
            return Outcome::Ignored;
        };
        let id = notification.id.as_str();

        if mapping.get(id).is_some_and(ProcessingState::is_processed) {
            debug!(notification_id = id, ticket_key, "already processed");
            return Outcome::Skipped;
        }

        if self.thread_has_confirmation(id).await {
            info!(
                notification_id = id,
                ticket_key, "confirmation reply found; marking processed"
            );
            mapping.upsert(
                id,
                ProcessingState::processed(ticket_key, PREVIOUSLY_ACKNOWLEDGED, now),
            );
            return Outcome::PreviouslyAcknowledged;
        }

        if let Some(actor) = self.find_acknowledger(id).await {
            let report = self.acknowledge(id, &ticket_key, &actor, mapping, now).await;
            return Outcome::Acknowledged { actor, report };
        }

        if mapping.get(id).is_some() {
            return Outcome::StillPending;
        }
        mapping.upsert(id, ProcessingState::checked(ticket_key, now));
        Outcome::FirstSighting
    }

    /// First qualifying actor currently reacting to the notification.
    ///
    /// A failed reaction lookup counts as "no acknowledgment yet".
    pub async fn find_acknowledger(&self, notification_id: &str) -> Option<String> {
        match self.chat.get_reactions(notification_id).await {
            Ok(reactions) => reaction::first_acknowledger(&reactions).map(str::to_owned),
            Err(err) => {
                warn!(notification_id, %err, "failed to read reactions");
                None
            }
        }
    }

    /// Run the workflow for `actor` and mark the notification `processed`.
    ///
    /// The entry is marked even when individual steps fail, so the attempt
    /// is never repeated.
    pub async fn acknowledge(
        &self,
        notification_id: &str,
        ticket_key: &str,
        actor: &str,
        mapping: &mut Mapping,
        now: DateTime<Utc>,
    ) -> ActuationReport {
        info!(notification_id, ticket_key, actor, "processing acknowledgment");
        let report = self
            .actuator
            .actuate(notification_id, ticket_key, actor, now)
            .await;
        mapping.upsert(
            notification_id,
            ProcessingState::processed(ticket_key, actor, now),
        );
        report
    }

    async fn thread_has_confirmation(&self, notification_id: &str) -> bool {
        match self.chat.get_thread_replies(notification_id).await {
            Ok(replies) => replies
                .iter()
                .any(|reply| messages::is_acknowledgment_reply(&reply.text)),
            Err(err) => {
                warn!(notification_id, %err, "failed to read thread replies");
                false
            }
        }
    }
}
