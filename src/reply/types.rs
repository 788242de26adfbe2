//! Wire and result types for the reply webhook

use serde::{Deserialize, Serialize};

/// Action name the webhook dispatches on
pub const SEND_ACTION: &str = "sendMessage";

/// Assistant reply plus the continuation token to use next time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    pub session_id: Option<String>,
}

impl Reply {
    pub fn new(text: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            text: text.into(),
            session_id,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WebhookRequest<'a> {
    pub session_id: Option<&'a str>,
    pub action: &'a str,
    pub chat_input: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct WebhookResponse {
    pub output: String,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl From<WebhookResponse> for Reply {
    fn from(response: WebhookResponse) -> Self {
        Reply::new(response.output, response.session_id)
    }
}
