//! Jira Cloud REST v3 client.

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::debug;

use crate::backend::{BackendFuture, TicketBackend};
use crate::models::ticket::Transition;
use crate::{config::JiraConfig, AppError, Result};

#[derive(Debug, Deserialize)]
struct UserSearchHit {
    #[serde(rename = "accountId")]
    account_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TransitionsResponse {
    #[serde(default)]
    transitions: Vec<Transition>,
}

#[derive(Debug, Deserialize)]
struct CreatedIssue {
    key: String,
}

/// Basic-auth Jira client.
pub struct JiraClient {
    http: reqwest::Client,
    base_url: Url,
    email: String,
    api_token: String,
}

impl JiraClient {
    /// Build the client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` if `base_url` is not a valid URL.
    pub fn new(config: &JiraConfig) -> Result<Self> {
        let mut base = config.base_url.trim_end_matches('/').to_owned();
        base.push('/');
        let base_url = Url::parse(&base)
            .map_err(|err| AppError::Config(format!("invalid jira.base_url: {err}")))?;

        Ok(Self {
            http: reqwest::Client::new(),
            base_url,
            email: config.email.clone(),
            api_token: config.api_token.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .map_err(|err| AppError::Tracker(format!("invalid endpoint {path}: {err}")))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .basic_auth(&self.email, Some(&self.api_token))
            .header("Accept", "application/json")
    }

    async fn send(&self, request: RequestBuilder, action: &str) -> Result<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| AppError::Tracker(format!("{action} failed: {err}")))?;
        expect_success(response, action).await
    }
}

/// Turn a non-2xx response into an error carrying the response body.
async fn expect_success(response: Response, action: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        debug!(action, %status, "jira call succeeded");
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(AppError::Tracker(format!("{action} returned {status}: {body}")))
}

async fn read_json<T: DeserializeOwned>(response: Response, action: &str) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|err| AppError::Tracker(format!("{action} returned unreadable body: {err}")))
}

impl TicketBackend for JiraClient {
    fn find_account_by_email<'a>(&'a self, email: &'a str) -> BackendFuture<'a, Option<String>> {
        Box::pin(async move {
            let mut url = self.endpoint("rest/api/3/user/search")?;
            url.query_pairs_mut().append_pair("query", email);
            let response = self
                .send(self.request(Method::GET, url), "user search")
                .await?;
            let hits: Vec<UserSearchHit> = read_json(response, "user search").await?;
            Ok(hits.into_iter().next().and_then(|hit| hit.account_id))
        })
    }

    fn set_assignee<'a>(
        &'a self,
        ticket_key: &'a str,
        account_id: &'a str,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let url = self.endpoint(&format!("rest/api/3/issue/{ticket_key}/assignee"))?;
            let request = self
                .request(Method::PUT, url)
                .json(&json!({ "accountId": account_id }));
            self.send(request, "assign").await?;
            Ok(())
        })
    }

    fn set_custom_field<'a>(
        &'a self,
        ticket_key: &'a str,
        field_id: &'a str,
        value: Value,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let url = self.endpoint(&format!("rest/api/3/issue/{ticket_key}"))?;
            let mut fields = serde_json::Map::new();
            fields.insert(field_id.to_owned(), value);
            let request = self
                .request(Method::PUT, url)
                .json(&json!({ "fields": fields }));
            self.send(request, "update field").await?;
            Ok(())
        })
    }

    fn list_transitions<'a>(&'a self, ticket_key: &'a str) -> BackendFuture<'a, Vec<Transition>> {
        Box::pin(async move {
            let url = self.endpoint(&format!("rest/api/3/issue/{ticket_key}/transitions"))?;
            let response = self
                .send(self.request(Method::GET, url), "list transitions")
                .await?;
            let body: TransitionsResponse = read_json(response, "list transitions").await?;
            Ok(body.transitions)
        })
    }

    fn apply_transition<'a>(
        &'a self,
        ticket_key: &'a str,
        transition_id: &'a str,
    ) -> BackendFuture<'a, ()> {
        Box::pin(async move {
            let url = self.endpoint(&format!("rest/api/3/issue/{ticket_key}/transitions"))?;
            let request = self
                .request(Method::POST, url)
                .json(&json!({ "transition": { "id": transition_id } }));
            self.send(request, "transition").await?;
            Ok(())
        })
    }

    fn create_issue(&self, fields: Value) -> BackendFuture<'_, String> {
        Box::pin(async move {
            let url = self.endpoint("rest/api/3/issue")?;
            let request = self
                .request(Method::POST, url)
                .json(&json!({ "fields": fields }));
            let response = self.send(request, "create issue").await?;
            if response.status() != StatusCode::CREATED {
                debug!(status = %response.status(), "create issue returned non-201 success");
            }
            let created: CreatedIssue = read_json(response, "create issue").await?;
            Ok(created.key)
        })
    }
}
