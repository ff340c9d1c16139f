//! Jira ticket backend.

pub mod client;
pub mod issue;
