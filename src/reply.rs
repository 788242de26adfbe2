//! Remote reply service
//!
//! Stateless request/response mapping from a user message and optional
//! continuation token to an assistant reply and the token to use next.

mod error;
mod types;
mod webhook;

#[cfg(test)]
pub mod testing;

pub use error::{ReplyError, ReplyErrorKind};
pub use types::Reply;
pub use webhook::{FailurePolicy, WebhookClient, WebhookConfig};
#[allow(unused_imports)] // Referenced by tests
pub use webhook::FAILURE_SESSION_PLACEHOLDER;

use async_trait::async_trait;
use std::sync::Arc;

/// Common interface for reply backends
#[async_trait]
pub trait ReplyService: Send + Sync {
    /// Submit one message. `session_id` is `None` for the first exchange.
    async fn send(&self, message: &str, session_id: Option<&str>) -> Result<Reply, ReplyError>;

    /// Where requests go, for logging
    fn endpoint(&self) -> &str;
}

/// Logging wrapper for reply services
pub struct LoggingService {
    inner: Arc<dyn ReplyService>,
    endpoint: String,
}

impl LoggingService {
    pub fn new(inner: Arc<dyn ReplyService>) -> Self {
        let endpoint = inner.endpoint().to_string();
        Self { inner, endpoint }
    }
}

#[async_trait]
impl ReplyService for LoggingService {
    async fn send(&self, message: &str, session_id: Option<&str>) -> Result<Reply, ReplyError> {
        let start = std::time::Instant::now();
        let result = self.inner.send(message, session_id).await;
        let duration = start.elapsed();

        match &result {
            Ok(reply) => {
                tracing::info!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    had_session = session_id.is_some(),
                    session_id = ?reply.session_id,
                    reply_chars = reply.text.chars().count(),
                    "Reply received"
                );
            }
            Err(e) => {
                tracing::error!(
                    endpoint = %self.endpoint,
                    duration_ms = %duration.as_millis(),
                    error = %e.message,
                    kind = ?e.kind,
                    "Reply request failed"
                );
            }
        }

        result
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::testing::MockReplyService;
    use super::*;

    #[tokio::test]
    async fn test_logging_service_passes_results_through() {
        let mock = Arc::new(MockReplyService::new());
        mock.queue_reply("hola", Some("s1"));
        mock.queue_error(ReplyError::network("down"));
        let service = LoggingService::new(mock.clone());

        assert_eq!(service.endpoint(), "mock://reply");
        let reply = service.send("a", None).await.unwrap();
        assert_eq!(reply, Reply::new("hola", Some("s1".into())));
        let err = service.send("b", Some("s1")).await.unwrap_err();
        assert_eq!(err.kind, ReplyErrorKind::Network);

        assert_eq!(
            mock.recorded_requests(),
            vec![("a".to_string(), None), ("b".to_string(), Some("s1".to_string()))]
        );
    }
}
