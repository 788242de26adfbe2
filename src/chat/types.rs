//! Conversation data model
//!
//! Field names serialize in camelCase and timestamps as Unix milliseconds,
//! which is the layout of the persisted records.

use chrono::Utc;
use serde::{Deserialize, Serialize};

/// Title given to a conversation before its first message
pub const DEFAULT_TITLE: &str = "Nueva Conversación";

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub username: String,
    pub is_authenticated: bool,
}

impl User {
    pub fn authenticated(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_authenticated: true,
        }
    }
}

/// Who wrote a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    User,
    Ai,
}

/// A single chat message. Never modified after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub content: String,
    pub sender: Sender,
    pub timestamp: i64,
}

impl Message {
    fn new(content: impl Into<String>, sender: Sender) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
            sender,
            timestamp: now_millis(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(content, Sender::User)
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::new(content, Sender::Ai)
    }
}

/// A titled conversation with its remote continuation token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    pub id: String,
    pub title: String,
    pub session_id: Option<String>,
    pub messages: Vec<Message>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Conversation {
    pub fn new(id: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            id: id.into(),
            title: DEFAULT_TITLE.to_string(),
            session_id: None,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// Optional field updates applied together with an append
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppendOptions {
    /// Applied only if the conversation had no messages before the append
    pub new_title: Option<String>,
    /// Applied only while the conversation has no session id
    pub new_session_id: Option<String>,
}
