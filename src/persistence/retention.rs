//! Time-based pruning of the mapping store.
//!
//! Entries are kept for `retention_hours` after their last state change,
//! whether still `checked` or already `processed`. A pruned notification
//! that shows up again in a later sweep is treated as unseen.

use chrono::{DateTime, Utc};
use tracing::info;

use super::mapping_store::Mapping;

/// Remove expired entries and report how many were dropped.
pub fn purge(mapping: &mut Mapping, now: DateTime<Utc>, retention: chrono::Duration) -> usize {
    let removed = mapping.prune(now, retention);
    info!(
        removed,
        kept = mapping.len(),
        retention_hours = retention.num_hours(),
        "retention purge completed"
    );
    removed
}
