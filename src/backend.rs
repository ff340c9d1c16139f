//! Capability interfaces for the chat and ticket backends.
//!
//! The acknowledgment engine only talks to these traits. Production code
//! plugs in [`SlackService`](crate::slack::client::SlackService) and
//! [`JiraClient`](crate::jira::client::JiraClient); tests plug in fakes.
//! Every call is a single request/response with no retry layer.

use std::future::Future;
use std::pin::Pin;

use serde_json::Value;

use crate::models::chat::{ActorProfile, ChatMessage, Reaction};
use crate::models::ticket::Transition;
use crate::Result;

/// Boxed future returned by backend calls.
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Chat channel operations, bound to the configured notification channel.
pub trait ChatBackend: Send + Sync {
    /// Most recent top-level messages, newest first, at most `limit`.
    fn list_recent_messages(&self, limit: u16) -> BackendFuture<'_, Vec<ChatMessage>>;

    /// Current reactions on a message.
    fn get_reactions<'a>(&'a self, message_id: &'a str) -> BackendFuture<'a, Vec<Reaction>>;

    /// Replies in the thread rooted at `message_id`.
    fn get_thread_replies<'a>(&'a self, message_id: &'a str)
        -> BackendFuture<'a, Vec<ChatMessage>>;

    /// Post a top-level message and return its id.
    fn post_message<'a>(&'a self, text: &'a str) -> BackendFuture<'a, String>;

    /// Post a threaded reply under `message_id` and return the reply id.
    fn post_reply<'a>(&'a self, message_id: &'a str, text: &'a str) -> BackendFuture<'a, String>;

    /// Look up the display name and contact email of an actor.
    fn resolve_actor_profile<'a>(&'a self, actor_id: &'a str) -> BackendFuture<'a, ActorProfile>;
}

/// Ticket tracker operations.
pub trait TicketBackend: Send + Sync {
    /// Resolve an assignable account from a contact email.
    fn find_account_by_email<'a>(&'a self, email: &'a str) -> BackendFuture<'a, Option<String>>;

    /// Assign a ticket to an account.
    fn set_assignee<'a>(&'a self, ticket_key: &'a str, account_id: &'a str)
        -> BackendFuture<'a, ()>;

    /// Write a single custom field on a ticket.
    fn set_custom_field<'a>(
        &'a self,
        ticket_key: &'a str,
        field_id: &'a str,
        value: Value,
    ) -> BackendFuture<'a, ()>;

    /// Transitions currently legal for a ticket.
    fn list_transitions<'a>(&'a self, ticket_key: &'a str) -> BackendFuture<'a, Vec<Transition>>;

    /// Apply a transition by id.
    fn apply_transition<'a>(
        &'a self,
        ticket_key: &'a str,
        transition_id: &'a str,
    ) -> BackendFuture<'a, ()>;

    /// Create a ticket from a full `fields` payload and return its key.
    fn create_issue(&self, fields: Value) -> BackendFuture<'_, String>;
}
