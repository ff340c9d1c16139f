//! Set of advisory links that already produced a notification.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::debug;

use crate::Result;

use super::write_atomic;

/// Seen-link cache persisted as a JSON array.
#[derive(Debug)]
pub struct SeenCache {
    path: PathBuf,
    links: BTreeSet<String>,
}

impl SeenCache {
    /// Load the cache; a missing file yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` on read failure and `AppError::Store` if the
    /// file is not a JSON array of strings.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let links = match std::fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw)?,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeSet::new(),
            Err(err) => return Err(err.into()),
        };
        debug!(path = %path.display(), count = links.len(), "seen cache loaded");
        Ok(Self { path, links })
    }

    /// Whether `link` was already notified.
    #[must_use]
    pub fn contains(&self, link: &str) -> bool {
        self.links.contains(link)
    }

    /// Record `link`; returns `false` if it was already present.
    pub fn insert(&mut self, link: impl Into<String>) -> bool {
        self.links.insert(link.into())
    }

    /// Number of cached links.
    #[must_use]
    pub fn len(&self) -> usize {
        self.links.len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    /// Persist the cache.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Io` or `AppError::Store` if the write fails.
    pub fn save(&self) -> Result<()> {
        let body = serde_json::to_vec(&self.links)?;
        write_atomic(&self.path, &body)
    }
}
