//! Mock reply services for testing

use super::{Reply, ReplyError, ReplyService};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

type Recorded = (String, Option<String>);

/// Mock reply service that returns queued results
pub struct MockReplyService {
    responses: Mutex<VecDeque<Result<Reply, ReplyError>>>,
    /// Record of every `(message, session_id)` sent
    requests: Mutex<Vec<Recorded>>,
}

#[allow(dead_code)]
impl MockReplyService {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn queue_reply(&self, text: &str, session_id: Option<&str>) {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(Reply::new(text, session_id.map(String::from))));
    }

    pub fn queue_error(&self, error: ReplyError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn recorded_requests(&self) -> Vec<Recorded> {
        self.requests.lock().unwrap().clone()
    }

    fn next(&self, message: &str, session_id: Option<&str>) -> Result<Reply, ReplyError> {
        self.requests
            .lock()
            .unwrap()
            .push((message.to_string(), session_id.map(String::from)));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ReplyError::network("No mock reply queued")))
    }
}

impl Default for MockReplyService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReplyService for MockReplyService {
    async fn send(&self, message: &str, session_id: Option<&str>) -> Result<Reply, ReplyError> {
        self.next(message, session_id)
    }

    fn endpoint(&self) -> &str {
        "mock://reply"
    }
}

/// Mock that holds each request until released (for observing in-flight state)
pub struct GatedReplyService {
    inner: MockReplyService,
    /// Notified when a request arrives
    pub request_started: Arc<Notify>,
    /// Notify once per request to let it complete
    pub release: Arc<Notify>,
}

#[allow(dead_code)]
impl GatedReplyService {
    pub fn new() -> Self {
        Self {
            inner: MockReplyService::new(),
            request_started: Arc::new(Notify::new()),
            release: Arc::new(Notify::new()),
        }
    }

    pub fn queue_reply(&self, text: &str, session_id: Option<&str>) {
        self.inner.queue_reply(text, session_id);
    }

    pub fn recorded_requests(&self) -> Vec<Recorded> {
        self.inner.recorded_requests()
    }
}

#[async_trait]
impl ReplyService for GatedReplyService {
    async fn send(&self, message: &str, session_id: Option<&str>) -> Result<Reply, ReplyError> {
        self.request_started.notify_one();
        self.release.notified().await;
        self.inner.next(message, session_id)
    }

    fn endpoint(&self) -> &str {
        "mock://gated"
    }
}
