//! Tracker-side entities.

use serde::{Deserialize, Serialize};

/// A workflow transition available on a ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transition {
    /// Tracker transition id.
    pub id: String,
    /// Human-readable transition name, e.g. `In Progress`.
    pub name: String,
}
