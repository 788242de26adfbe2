//! Reply service error types

use thiserror::Error;

/// Remote reply failure with classification
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ReplyError {
    pub kind: ReplyErrorKind,
    pub message: String,
}

impl ReplyError {
    pub fn new(kind: ReplyErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ReplyErrorKind::Network, message)
    }

    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ReplyErrorKind::MalformedResponse, message)
    }

    /// Classify a non-success HTTP status
    pub fn from_status(status: u16, body: &str) -> Self {
        let kind = match status {
            401 | 403 => ReplyErrorKind::Auth,
            400..=499 => ReplyErrorKind::InvalidRequest,
            500..=599 => ReplyErrorKind::ServerError,
            _ => ReplyErrorKind::Unknown,
        };
        Self::new(kind, format!("Request failed with status code {status}: {body}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyErrorKind {
    /// Connection refused, DNS, TLS, timeouts
    Network,
    /// 401 / 403 from the webhook
    Auth,
    /// Other 4xx
    InvalidRequest,
    /// 5xx
    ServerError,
    /// 2xx with a body that is not `{output, sessionId}`
    MalformedResponse,
    Unknown,
}
