//! Advisory intake: relevance filtering, text cleanup, the notify flow, and
//! the curated feed it writes.

pub mod curated;
pub mod intake;
pub mod relevance;
pub mod text;
