#![forbid(unsafe_code)]

//! Security advisory triage relay.
//!
//! Files tickets for relevant advisories, announces them in Slack, and
//! turns a thumbs-up on the announcement into ticket assignment and a
//! workflow transition, exactly once per notification.

pub mod ack;
pub mod backend;
pub mod config;
pub mod errors;
pub mod feed;
pub mod jira;
pub mod models;
pub mod persistence;
pub mod slack;

pub use config::GlobalConfig;
pub use errors::{AppError, Result};
