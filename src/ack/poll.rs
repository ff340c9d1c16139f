//! The two invocation shapes around the reconciliation engine.
//!
//! - [`sweep`] walks recent channel history once and reconciles every
//!   ticket notification; meant to run on a schedule.
//! - [`watch`] polls a single freshly posted notification on a fixed
//!   interval until acknowledged or timed out.
//!
//! Both block the calling task for their whole duration and must not run
//! concurrently against the same mapping file.

use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::{sleep, Instant};
use tracing::{error, info, info_span, Instrument};

use crate::ack::extract;
use crate::ack::reconcile::{Outcome, Reconciler};
use crate::backend::ChatBackend;
use crate::models::state::ProcessingState;
use crate::persistence::mapping_store::MappingStore;
use crate::persistence::retention;
use crate::Result;

/// Counters reported at the end of a sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepSummary {
    /// Notifications carrying a ticket key.
    pub found: usize,
    /// Already processed, or found acknowledged in-thread.
    pub skipped: usize,
    /// Inspected for reactions.
    pub checked: usize,
    /// Acknowledged and actuated during this sweep.
    pub newly_processed: usize,
    /// Entries dropped by retention before the sweep.
    pub pruned: usize,
}

impl SweepSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Ignored => return,
            Outcome::Skipped | Outcome::PreviouslyAcknowledged => self.skipped += 1,
            Outcome::Acknowledged { .. } => {
                self.checked += 1;
                self.newly_processed += 1;
            }
            Outcome::FirstSighting | Outcome::StillPending => self.checked += 1,
        }
        self.found += 1;
    }
}

/// Sweep settings.
#[derive(Debug, Clone)]
pub struct SweepOptions {
    /// Number of recent messages to inspect.
    pub history_limit: u16,
    /// How long mapping entries are kept.
    pub retention: chrono::Duration,
}

/// Prune the store, reconcile recent notifications, and save.
///
/// Backend failures are logged and never abort the sweep.
///
/// # Errors
///
/// Returns an error only if the mapping file cannot be read or written.
pub async fn sweep(
    reconciler: &Reconciler<'_>,
    chat: &dyn ChatBackend,
    store: &MappingStore,
    options: &SweepOptions,
    now: DateTime<Utc>,
) -> Result<SweepSummary> {
    let span = info_span!("sweep", limit = options.history_limit);
    async move {
        let mut session = store.open()?;
        info!(entries = session.len(), "mapping loaded");

        let mut summary = SweepSummary {
            pruned: retention::purge(&mut session, now, options.retention),
            ..SweepSummary::default()
        };

        let messages = match chat.list_recent_messages(options.history_limit).await {
            Ok(messages) => messages,
            Err(err) => {
                error!(%err, "failed to list recent messages");
                Vec::new()
            }
        };
        info!(count = messages.len(), "checking recent messages");

        for message in messages
            .iter()
            .filter(|message| extract::is_ticket_notification(&message.text))
        {
            let outcome = reconciler.reconcile(message, &mut session, now).await;
            summary.record(&outcome);
        }

        session.commit()?;
        info!(
            found = summary.found,
            skipped = summary.skipped,
            checked = summary.checked,
            newly_processed = summary.newly_processed,
            pruned = summary.pruned,
            "sweep complete"
        );
        Ok(summary)
    }
    .instrument(span)
    .await
}

/// How an immediate watch ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WatchOutcome {
    /// The store already marked the notification processed.
    AlreadyProcessed,
    /// A qualifying reaction arrived and the workflow ran.
    Acknowledged {
        /// Acting user.
        actor: String,
    },
    /// No acknowledgment before the timeout; left for the sweep.
    TimedOut,
}

/// Poll parameters for [`watch`].
#[derive(Debug, Clone, Copy)]
pub struct WatchOptions {
    /// Delay between checks.
    pub interval: Duration,
    /// Total time budget.
    pub timeout: Duration,
}

/// Poll one notification until acknowledged or `timeout` elapses.
///
/// On timeout the store is left as it was.
///
/// # Errors
///
/// Returns an error only if the mapping file cannot be read or written.
pub async fn watch(
    reconciler: &Reconciler<'_>,
    store: &MappingStore,
    notification_id: &str,
    ticket_key: &str,
    options: WatchOptions,
) -> Result<WatchOutcome> {
    let span = info_span!("watch", notification_id, ticket_key);
    async move {
        if store
            .load()?
            .get(notification_id)
            .is_some_and(ProcessingState::is_processed)
        {
            info!("notification already processed");
            return Ok(WatchOutcome::AlreadyProcessed);
        }

        info!(
            timeout_secs = options.timeout.as_secs(),
            "polling for acknowledgment reactions"
        );
        let started = Instant::now();
        while started.elapsed() < options.timeout {
            if let Some(actor) = reconciler.find_acknowledger(notification_id).await {
                let mut session = store.open()?;
                reconciler
                    .acknowledge(notification_id, ticket_key, &actor, &mut session, Utc::now())
                    .await;
                session.commit()?;
                return Ok(WatchOutcome::Acknowledged { actor });
            }
            sleep(options.interval).await;
        }

        info!("no acknowledgment before timeout; leaving for sweep");
        Ok(WatchOutcome::TimedOut)
    }
    .instrument(span)
    .await
}
