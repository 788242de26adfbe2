//! HTTP webhook reply service
//!
//! POSTs `{sessionId, action, chatInput}` with a Basic credential and reads
//! back `{output, sessionId}`.

use super::types::{Reply, WebhookRequest, WebhookResponse, SEND_ACTION};
use super::{ReplyError, ReplyErrorKind, ReplyService};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

/// Session id reported alongside a stringified failure
pub const FAILURE_SESSION_PLACEHOLDER: &str = "sdfsdf";

const FAILURE_PREFIX: &str = "Error enviando mensaje al trigger de n8n";

/// What the client hands back when the webhook call fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Turn the failure into an ordinary-looking reply carrying the error
    /// text and the placeholder session id
    #[default]
    Reply,
    /// Return the typed error to the caller
    Error,
}

impl FailurePolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "reply" => Some(Self::Reply),
            "error" => Some(Self::Error),
            _ => None,
        }
    }
}

/// Webhook endpoint and credentials
#[derive(Debug, Clone)]
pub struct WebhookConfig {
    pub url: String,
    pub username: String,
    pub password: String,
    pub failure_policy: FailurePolicy,
    /// `None` waits for the webhook indefinitely
    pub timeout: Option<Duration>,
}

impl WebhookConfig {
    /// `Authorization` header value for the configured credential pair
    pub fn authorization(&self) -> String {
        let token = STANDARD.encode(format!("{}:{}", self.username, self.password));
        format!("Basic {token}")
    }
}

pub struct WebhookClient {
    client: Client,
    url: String,
    authorization: String,
    failure_policy: FailurePolicy,
}

impl WebhookClient {
    pub fn new(config: &WebhookConfig) -> Result<Self, ReplyError> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| {
            ReplyError::new(
                ReplyErrorKind::Unknown,
                format!("Failed to create HTTP client: {e}"),
            )
        })?;

        Ok(Self {
            client,
            url: config.url.clone(),
            authorization: config.authorization(),
            failure_policy: config.failure_policy,
        })
    }

    async fn post(&self, message: &str, session_id: Option<&str>) -> Result<Reply, ReplyError> {
        let body = WebhookRequest {
            session_id,
            action: SEND_ACTION,
            chat_input: message,
        };

        let response = self
            .client
            .post(&self.url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, &self.authorization)
            .json(&body)
            .send()
            .await
            .map_err(|e| ReplyError::network(e.to_string()))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ReplyError::network(e.to_string()))?;

        if !status.is_success() {
            return Err(ReplyError::from_status(status.as_u16(), &text));
        }

        let parsed: WebhookResponse = serde_json::from_str(&text)
            .map_err(|e| ReplyError::malformed(format!("Unexpected webhook response: {e}")))?;
        Ok(parsed.into())
    }
}

/// The reply produced under [`FailurePolicy::Reply`]
pub fn failure_reply(error: &ReplyError) -> Reply {
    Reply::new(
        format!("{FAILURE_PREFIX}: {error}"),
        Some(FAILURE_SESSION_PLACEHOLDER.to_string()),
    )
}

#[async_trait]
impl ReplyService for WebhookClient {
    async fn send(&self, message: &str, session_id: Option<&str>) -> Result<Reply, ReplyError> {
        match self.post(message, session_id).await {
            Ok(reply) => Ok(reply),
            Err(e) => match self.failure_policy {
                FailurePolicy::Reply => {
                    tracing::warn!(error = %e, kind = ?e.kind, "Webhook failed, replying with error text");
                    Ok(failure_reply(&e))
                }
                FailurePolicy::Error => Err(e),
            },
        }
    }

    fn endpoint(&self) -> &str {
        &self.url
    }
}
