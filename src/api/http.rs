//! Blocking HTTP client for the CDE gitspace REST API.

use super::{ApiError, GitspaceApi, StartStopIntent};
use crate::config::Config;
use crate::error::{GitspaceError, Result};
use crate::gitspace::GitspaceRecord;
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{ACCEPT, AUTHORIZATION};
use serde::Serialize;
use std::time::Duration;

const USER_AGENT: &str = concat!("gitspaces-cli/", env!("CARGO_PKG_VERSION"));

#[derive(Serialize)]
struct ActionBody {
    action: StartStopIntent,
}

pub struct HttpGitspaceClient {
    client: Client,
    collection_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpGitspaceClient {
    /// Build a client for the account/org/project scope in `config`.
    ///
    /// The bearer token is read from the environment variable named by
    /// `config.token_env`; requests go out unauthenticated when it is unset.
    pub fn from_config(config: &Config) -> Result<Self> {
        let token = std::env::var(&config.token_env)
            .ok()
            .filter(|value| !value.trim().is_empty());
        Self::new(config, token)
    }

    pub fn new(config: &Config, token: Option<String>) -> Result<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| GitspaceError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            collection_url: collection_url(config),
            token,
            timeout: Duration::from_secs(config.request_timeout_secs),
        })
    }

    fn gitspace_url(&self, id: &str) -> String {
        format!("{}/{}", self.collection_url, id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(ACCEPT, "application/json");
        match &self.token {
            Some(token) => request.header(AUTHORIZATION, format!("Bearer {token}")),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> std::result::Result<Response, ApiError> {
        let response = self.authorize(request).send().map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout)
            } else {
                ApiError::Network(e.to_string())
            }
        })?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status().as_u16();
        let body = response.text().unwrap_or_default();
        Err(ApiError::Http {
            status,
            message: error_message_from_body(&body),
        })
    }
}

impl GitspaceApi for HttpGitspaceClient {
    fn list_gitspaces(&self) -> std::result::Result<Vec<GitspaceRecord>, ApiError> {
        tracing::debug!(url = %self.collection_url, "listing gitspaces");
        let response = self.send(self.client.get(&self.collection_url))?;
        response
            .json::<Vec<GitspaceRecord>>()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn gitspace_action(
        &self,
        id: &str,
        intent: StartStopIntent,
    ) -> std::result::Result<(), ApiError> {
        let url = format!("{}/actions", self.gitspace_url(id));
        tracing::debug!(%url, %intent, "sending gitspace action");
        self.send(self.client.post(&url).json(&ActionBody { action: intent }))?;
        Ok(())
    }

    fn delete_gitspace(&self, id: &str) -> std::result::Result<(), ApiError> {
        let url = self.gitspace_url(id);
        tracing::debug!(%url, "deleting gitspace");
        self.send(self.client.delete(&url))?;
        Ok(())
    }
}

fn collection_url(config: &Config) -> String {
    format!(
        "{}/cde/api/v1/accounts/{}/orgs/{}/projects/{}/gitspaces",
        config.base_url.trim_end_matches('/'),
        config.account,
        config.org,
        config.project
    )
}

/// Pull a human-readable message out of an error body.
///
/// The service answers with `{"message": "..."}`; anything else is reduced to
/// its first non-empty line.
fn error_message_from_body(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = value.get("message").and_then(|m| m.as_str()) {
            return message.trim().to_string();
        }
    }
    body.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or_default()
        .to_string()
}
