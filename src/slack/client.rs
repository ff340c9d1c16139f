//! Slack Web API client for the notification channel.
//!
//! Calls are issued one at a time on the caller's task. There is no send
//! queue and no retry: a failed call surfaces as `AppError::Slack` and the
//! caller decides whether it matters.

use slack_morphism::prelude::{
    SlackApiChatPostMessageRequest, SlackApiConversationsHistoryRequest,
    SlackApiConversationsRepliesRequest, SlackApiToken, SlackApiTokenType, SlackApiTokenValue,
    SlackApiUsersInfoRequest, SlackChannelId, SlackClient, SlackClientHyperHttpsConnector,
    SlackClientSession, SlackHistoryMessage, SlackMessageContent, SlackTs, SlackUserId,
};
use tracing::{debug, info};

use crate::backend::{BackendFuture, ChatBackend};
use crate::models::chat::{ActorProfile, ChatMessage, Reaction, UNKNOWN_USER};
use crate::{config::SlackConfig, AppError, Result};

/// Message to be delivered to Slack via chat.postMessage.
#[derive(Debug, Clone)]
pub struct SlackMessage {
    /// Target channel.
    pub channel: SlackChannelId,
    /// Plain message text.
    pub text: String,
    /// Parent message when posting a threaded reply.
    pub thread_ts: Option<SlackTs>,
}

impl SlackMessage {
    /// Create a plain-text message for a channel.
    pub fn plain(channel: SlackChannelId, text: impl Into<String>) -> Self {
        Self {
            channel,
            text: text.into(),
            thread_ts: None,
        }
    }

    /// Create a plain-text reply in the thread rooted at `thread_ts`.
    pub fn reply(channel: SlackChannelId, thread_ts: SlackTs, text: impl Into<String>) -> Self {
        Self {
            channel,
            text: text.into(),
            thread_ts: Some(thread_ts),
        }
    }

    fn into_request(self) -> SlackApiChatPostMessageRequest {
        let content = SlackMessageContent {
            text: Some(self.text),
            blocks: None,
            attachments: None,
            upload: None,
            files: None,
            reactions: None,
            metadata: None,
            markdown_text: None,
        };

        SlackApiChatPostMessageRequest {
            channel: self.channel,
            content,
            as_user: None,
            icon_emoji: None,
            icon_url: None,
            link_names: Some(true),
            parse: None,
            thread_ts: self.thread_ts,
            username: None,
            reply_broadcast: None,
            unfurl_links: None,
            unfurl_media: None,
        }
    }
}

/// Bot-token Slack client bound to one channel.
pub struct SlackService {
    client: SlackClient<SlackClientHyperHttpsConnector>,
    bot_token: SlackApiToken,
    channel: SlackChannelId,
}

impl SlackService {
    /// Build the client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the HTTPS connector cannot be created.
    pub fn new(config: &SlackConfig) -> Result<Self> {
        let connector = SlackClientHyperHttpsConnector::new()
            .map_err(|err| AppError::Slack(format!("failed to init slack connector: {err}")))?;
        let bot_token = SlackApiToken {
            token_value: SlackApiTokenValue(config.bot_token.clone()),
            cookie: None,
            team_id: None,
            scope: None,
            token_type: Some(SlackApiTokenType::Bot),
        };

        info!(channel = %config.channel_id, "slack client ready");

        Ok(Self {
            client: SlackClient::new(connector),
            bot_token,
            channel: SlackChannelId(config.channel_id.clone()),
        })
    }

    /// Create an HTTP session for direct API calls using the bot token.
    #[must_use]
    pub fn http_session(&self) -> SlackClientSession<'_, SlackClientHyperHttpsConnector> {
        self.client.open_session(&self.bot_token)
    }

    /// Fetch recent channel history, newest first.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the Slack API call fails.
    pub async fn fetch_recent_history(&self, limit: u16) -> Result<Vec<SlackHistoryMessage>> {
        let request = SlackApiConversationsHistoryRequest {
            channel: Some(self.channel.clone()),
            cursor: None,
            latest: None,
            limit: Some(limit),
            oldest: None,
            inclusive: None,
            include_all_metadata: None,
        };

        self.http_session()
            .conversations_history(&request)
            .await
            .map(|response| response.messages)
            .map_err(|err| AppError::Slack(format!("failed to read history: {err}")))
    }

    /// Fetch a single top-level message by its `ts`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the call fails and `AppError::NotFound`
    /// if the channel has no message with that `ts`.
    pub async fn fetch_message(&self, ts: &str) -> Result<SlackHistoryMessage> {
        let request = SlackApiConversationsHistoryRequest {
            channel: Some(self.channel.clone()),
            cursor: None,
            latest: Some(SlackTs(ts.to_owned())),
            limit: Some(1),
            oldest: Some(SlackTs(ts.to_owned())),
            inclusive: Some(true),
            include_all_metadata: None,
        };

        let messages = self
            .http_session()
            .conversations_history(&request)
            .await
            .map(|response| response.messages)
            .map_err(|err| AppError::Slack(format!("failed to read message {ts}: {err}")))?;

        messages
            .into_iter()
            .find(|message| message.origin.ts.to_string() == ts)
            .ok_or_else(|| AppError::NotFound(format!("message {ts} not in channel history")))
    }

    /// Post a message and return its `ts`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Slack` if the Slack API call fails.
    pub async fn send(&self, message: SlackMessage) -> Result<String> {
        let request = message.into_request();
        let response = self
            .http_session()
            .chat_post_message(&request)
            .await
            .map_err(|err| AppError::Slack(format!("failed to post message: {err}")))?;
        debug!(ts = %response.ts, "sent slack message");
        Ok(response.ts.to_string())
    }
}

fn to_chat_message(message: SlackHistoryMessage) -> ChatMessage {
    ChatMessage {
        id: message.origin.ts.to_string(),
        text: message.content.text.unwrap_or_default(),
    }
}

fn to_reactions(message: &SlackHistoryMessage) -> Vec<Reaction> {
    message
        .content
        .reactions
        .as_ref()
        .map(|reactions| {
            reactions
                .iter()
                .map(|reaction| Reaction {
                    name: reaction.name.0.clone(),
                    actors: reaction.users.iter().map(|user| user.0.clone()).collect(),
                })
                .collect()
        })
        .unwrap_or_default()
}

impl ChatBackend for SlackService {
    fn list_recent_messages(&self, limit: u16) -> BackendFuture<'_, Vec<ChatMessage>> {
        Box::pin(async move {
            let history = self.fetch_recent_history(limit).await?;
            Ok(history.into_iter().map(to_chat_message).collect())
        })
    }

    fn get_reactions<'a>(&'a self, message_id: &'a str) -> BackendFuture<'a, Vec<Reaction>> {
        Box::pin(async move {
            let message = self.fetch_message(message_id).await?;
            Ok(to_reactions(&message))
        })
    }

    fn get_thread_replies<'a>(
        &'a self,
        message_id: &'a str,
    ) -> BackendFuture<'a, Vec<ChatMessage>> {
        Box::pin(async move {
            let request = SlackApiConversationsRepliesRequest::new(
                self.channel.clone(),
                SlackTs(message_id.to_owned()),
            );
            let response = self
                .http_session()
                .conversations_replies(&request)
                .await
                .map_err(|err| {
                    AppError::Slack(format!("failed to read replies for {message_id}: {err}"))
                })?;
            Ok(response.messages.into_iter().map(to_chat_message).collect())
        })
    }

    fn post_message<'a>(&'a self, text: &'a str) -> BackendFuture<'a, String> {
        Box::pin(async move {
            self.send(SlackMessage::plain(self.channel.clone(), text))
                .await
        })
    }

    fn post_reply<'a>(&'a self, message_id: &'a str, text: &'a str) -> BackendFuture<'a, String> {
        Box::pin(async move {
            self.send(SlackMessage::reply(
                self.channel.clone(),
                SlackTs(message_id.to_owned()),
                text,
            ))
            .await
        })
    }

    fn resolve_actor_profile<'a>(&'a self, actor_id: &'a str) -> BackendFuture<'a, ActorProfile> {
        Box::pin(async move {
            let request = SlackApiUsersInfoRequest::new(SlackUserId(actor_id.to_owned()));
            let user = self
                .http_session()
                .users_info(&request)
                .await
                .map(|response| response.user)
                .map_err(|err| AppError::Slack(format!("failed to look up {actor_id}: {err}")))?;

            Ok(ActorProfile {
                display_name: user.name.unwrap_or_else(|| UNKNOWN_USER.to_owned()),
                contact_email: user
                    .profile
                    .and_then(|profile| profile.email)
                    .map(|email| email.to_string()),
            })
        })
    }
}
