//! Advisory intake: ticket, notify, and watch for each new relevant entry,
//! then rewrite the curated feed.

use std::path::Path;

use tracing::{debug, error, info, info_span, warn, Instrument};

use crate::ack::poll::{self, WatchOptions, WatchOutcome};
use crate::ack::reconcile::Reconciler;
use crate::backend::{ChatBackend, TicketBackend};
use crate::config::GlobalConfig;
use crate::feed::curated::CuratedFeed;
use crate::feed::relevance;
use crate::jira::issue;
use crate::models::advisory::Advisory;
use crate::persistence::mapping_store::MappingStore;
use crate::persistence::seen_cache::SeenCache;
use crate::slack::messages;
use crate::{AppError, Result};

/// Counters reported at the end of an intake run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntakeSummary {
    /// Entries received.
    pub total: usize,
    /// Relevant entries not seen before.
    pub new: usize,
    /// Tickets created.
    pub tickets: usize,
    /// Notifications posted.
    pub notified: usize,
    /// Notifications acknowledged during the immediate watch.
    pub acknowledged: usize,
}

/// Read advisory entries from a JSON array file.
///
/// # Errors
///
/// Returns `AppError::Io` if the file cannot be read and `AppError::Store`
/// if it is not a JSON array of advisories.
pub fn load_entries(path: &Path) -> Result<Vec<Advisory>> {
    let raw = std::fs::read_to_string(path)
        .map_err(|err| AppError::Io(format!("cannot read {}: {err}", path.display())))?;
    Ok(serde_json::from_str(&raw)?)
}

/// Everything the intake flow needs to act on one run.
pub struct Intake<'a> {
    /// Loaded configuration.
    pub config: &'a GlobalConfig,
    /// Chat backend for notifications.
    pub chat: &'a dyn ChatBackend,
    /// Ticket backend for issue creation.
    pub tickets: &'a dyn TicketBackend,
    /// Engine used by the immediate watch.
    pub reconciler: &'a Reconciler<'a>,
    /// Mapping store the immediate watch writes to.
    pub store: &'a MappingStore,
}

impl Intake<'_> {
    /// Process `entries` in order, persist the seen cache, and write the
    /// curated feed.
    ///
    /// The mapping store is read once up front so a corrupt store stops the
    /// run before any ticket is filed or message posted.
    ///
    /// # Errors
    ///
    /// Returns an error if the seen cache, mapping store, or curated feed
    /// cannot be read or written. Backend failures are logged only.
    pub async fn run(&self, entries: &[Advisory], seen: &mut SeenCache) -> Result<IntakeSummary> {
        let mapped = self.store.load()?.len();
        let mut summary = IntakeSummary {
            total: entries.len(),
            ..IntakeSummary::default()
        };
        let ticketing = !self.config.jira.project_key.trim().is_empty();
        if !ticketing {
            warn!("jira.project_key is not set; notifying without tickets");
        }
        info!(total = entries.len(), mapped, "checking advisory entries");

        let mut curated = CuratedFeed::new(&self.config.feed);
        for advisory in entries {
            if relevance::is_excluded(&self.config.feed, advisory) {
                debug!(link = %advisory.link, "excluded by link fragment");
                continue;
            }
            let matches = relevance::score(&self.config.feed, advisory);
            if !matches.is_relevant() {
                continue;
            }
            curated.push(advisory);
            if seen.contains(&advisory.link) {
                debug!(link = %advisory.link, "entry already notified");
                continue;
            }
            summary.new += 1;

            let span = info_span!("advisory", link = %advisory.link);
            let outcome = self
                .process(advisory, ticketing, &mut summary)
                .instrument(span)
                .await;
            seen.insert(advisory.link.clone());
            if let Err(err) = outcome {
                seen.save()?;
                return Err(err);
            }
        }

        seen.save()?;
        curated.write()?;
        info!(
            new = summary.new,
            tickets = summary.tickets,
            notified = summary.notified,
            acknowledged = summary.acknowledged,
            curated = curated.len(),
            "intake complete"
        );
        Ok(summary)
    }

    async fn process(
        &self,
        advisory: &Advisory,
        ticketing: bool,
        summary: &mut IntakeSummary,
    ) -> Result<()> {
        let ticket_key = if ticketing {
            self.create_ticket(advisory, summary).await
        } else {
            None
        };

        let text = messages::advisory_notification(
            &self.config.feed.source_name,
            advisory,
            &self.config.jira.base_url,
            ticket_key.as_deref(),
        );
        let notification_id = match self.chat.post_message(&text).await {
            Ok(id) => {
                summary.notified += 1;
                id
            }
            Err(err) => {
                error!(%err, "failed to post notification");
                return Ok(());
            }
        };

        let Some(ticket_key) = ticket_key else {
            warn!(notification_id, "notification has no ticket; nothing to watch");
            return Ok(());
        };

        let options = WatchOptions {
            interval: self.config.watch.interval(),
            timeout: self.config.watch.timeout(),
        };
        let outcome = poll::watch(
            self.reconciler,
            self.store,
            &notification_id,
            &ticket_key,
            options,
        )
        .await?;
        if matches!(outcome, WatchOutcome::Acknowledged { .. }) {
            summary.acknowledged += 1;
        }
        Ok(())
    }

    async fn create_ticket(
        &self,
        advisory: &Advisory,
        summary: &mut IntakeSummary,
    ) -> Option<String> {
        let fields = issue::new_issue_fields(&self.config.jira, &self.config.feed, advisory);
        match self.tickets.create_issue(fields).await {
            Ok(key) => {
                info!(ticket_key = %key, "ticket created");
                summary.tickets += 1;
                Some(key)
            }
            Err(err) => {
                error!(%err, "ticket creation failed; notifying without ticket");
                None
            }
        }
    }
}
