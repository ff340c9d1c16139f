//! Notification-to-ticket mapping store backed by a single JSON file.
//!
//! The whole mapping is loaded into memory at the start of an invocation
//! and written back in full at the end. There is no locking: only one
//! process may hold the store at a time.

use std::collections::btree_map::{BTreeMap, Iter};
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

use crate::models::state::ProcessingState;
use crate::Result;

use super::write_atomic;

/// In-memory view of the notification id -> state mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Mapping {
    entries: BTreeMap<String, ProcessingState>,
}

impl Mapping {
    /// Look up the state recorded for a notification.
    #[must_use]
    pub fn get(&self, notification_id: &str) -> Option<&ProcessingState> {
        self.entries.get(notification_id)
    }

    /// Insert or replace the state for a notification.
    ///
    /// A `processed` entry is never downgraded back to `checked`; such a
    /// write is dropped and `false` is returned.
    pub fn upsert(&mut self, notification_id: impl Into<String>, state: ProcessingState) -> bool {
        let notification_id = notification_id.into();
        if let Some(existing) = self.entries.get(&notification_id) {
            if existing.is_processed() && !state.is_processed() {
                warn!(
                    notification_id,
                    "refusing to downgrade processed mapping entry"
                );
                return false;
            }
        }
        self.entries.insert(notification_id, state);
        true
    }

    /// Drop entries whose `event_time` is older than `now - retention`.
    ///
    /// Returns the number of entries removed.
    pub fn prune(&mut self, now: DateTime<Utc>, retention: chrono::Duration) -> usize {
        let cutoff = now - retention;
        let before = self.entries.len();
        self.entries.retain(|_, state| state.event_time > cutoff);
        before - self.entries.len()
    }

    /// Number of tracked notifications.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in notification id order.
    pub fn iter(&self) -> Iter<'_, String, ProcessingState> {
        self.entries.iter()
    }
}

/// File location of the persisted mapping.
#[derive(Debug, Clone)]
pub struct MappingStore {
    path: PathBuf,
}

impl MappingStore {
    /// Bind the store to a file path. Nothing is read until [`load`](Self::load).
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backing file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the full mapping from disk.
    ///
    /// A missing file yields an empty mapping.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` if the file exists but cannot be read and
    /// `AppError::Store` if its content is not a valid mapping.
    pub fn load(&self) -> Result<Mapping> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no mapping file, starting empty");
                return Ok(Mapping::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&raw)?)
    }

    /// Replace the file content with `mapping`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` or `AppError::Store` if the write fails.
    pub fn save(&self, mapping: &Mapping) -> Result<()> {
        let body = serde_json::to_vec_pretty(mapping)?;
        write_atomic(&self.path, &body)?;
        debug!(path = %self.path.display(), entries = mapping.len(), "mapping saved");
        Ok(())
    }

    /// Load the mapping and hand out a session that writes it back.
    ///
    /// # Errors
    ///
    /// Propagates [`load`](Self::load) failures.
    pub fn open(&self) -> Result<StoreSession<'_>> {
        let mapping = self.load()?;
        Ok(StoreSession {
            store: self,
            mapping,
            committed: false,
        })
    }
}

/// Scoped access to the mapping.
///
/// Call [`commit`](Self::commit) to persist and observe errors. A session
/// dropped without committing (early return, `?`, panic unwind) still
/// flushes, logging any failure.
pub struct StoreSession<'a> {
    store: &'a MappingStore,
    mapping: Mapping,
    committed: bool,
}

impl StoreSession<'_> {
    /// Persist the mapping and close the session.
    ///
    /// # Errors
    ///
    /// Returns the underlying [`MappingStore::save`] error.
    pub fn commit(mut self) -> Result<()> {
        self.committed = true;
        self.store.save(&self.mapping)
    }
}

impl Deref for StoreSession<'_> {
    type Target = Mapping;

    fn deref(&self) -> &Self::Target {
        &self.mapping
    }
}

impl DerefMut for StoreSession<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.mapping
    }
}

impl Drop for StoreSession<'_> {
    fn drop(&mut self) {
        if self.committed {
            return;
        }
        if let Err(err) = self.store.save(&self.mapping) {
            error!(%err, path = %self.store.path.display(), "failed to flush mapping on drop");
        }
    }
}
