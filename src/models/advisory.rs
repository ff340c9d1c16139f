//! Advisory entries handed over by the feed fetcher.

use serde::{Deserialize, Serialize};

/// A single advisory feed entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Advisory {
    /// Entry title.
    pub title: String,
    /// Canonical link; also the dedup key.
    pub link: String,
    /// HTML description as published by the feed.
    #[serde(default)]
    pub description: String,
    /// Publication date string, passed through verbatim.
    #[serde(default)]
    pub published: String,
}
