//! Conversation controller
//!
//! Owns the application state (user, conversations, selection, loading
//! flag) and is the only way to mutate it. Sending a message is split into
//! two phases so callers can observe the optimistic state in between:
//!
//! 1. [`ChatController::begin_send`] appends the user message, sets the
//!    title on a first message and raises the loading flag.
//! 2. [`ChatController::complete_send`] awaits the reply service and appends
//!    either the assistant reply or a fixed error message.
//!
//! Only one send is in flight at a time. A second send started before the
//! first settles is refused, so it can never go out without the session id
//! the first reply establishes.
//!
//! Everything except login requires a signed-in user. The store lock is
//! never held across the await in phase two.


use crate::auth::{AuthError, Credentials};
use crate::chat::{
    title_from_first_message, AppendOptions, Conversation, ConversationStore, Message, User,
};
use crate::reply::ReplyService;
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::broadcast;

/// Assistant message appended when the reply service returns an error
pub const REPLY_ERROR_TEXT: &str =
    "Disculpa, encontré un error procesando tu solicitud. Por favor intenta de nuevo.";

const EVENT_CAPACITY: usize = 64;

/// Change notifications for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEvent {
    UserChanged {
        user: Option<User>,
    },
    /// Conversation list or selection changed
    ConversationsChanged {
        current_id: Option<String>,
    },
    MessageAppended {
        conversation_id: String,
        message: Message,
    },
    LoadingChanged {
        is_loading: bool,
    },
}

/// Reasons an operation is refused before anything changes
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    #[error("Not signed in")]
    NotAuthenticated,
    #[error("Message is empty")]
    EmptyMessage,
    #[error("Conversation not found: {0}")]
    ConversationNotFound(String),
    #[error("Another message is still waiting for its reply")]
    Busy,
}

/// How a send settled; carries the assistant message that was appended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Replied(Message),
    Failed(Message),
}

impl SendOutcome {
    pub fn message(&self) -> &Message {
        match self {
            SendOutcome::Replied(m) | SendOutcome::Failed(m) => m,
        }
    }
}

/// Point-in-time copy of everything the presentation layer renders.
///
/// Empty while nobody is signed in.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatSnapshot {
    pub user: Option<User>,
    pub conversations: Vec<Conversation>,
    pub current_conversation_id: Option<String>,
    pub is_loading: bool,
}

/// Holds the loading flag while alive. At most one exists at a time.
struct LoadingGuard {
    loading: Arc<AtomicBool>,
    events: broadcast::Sender<ChatEvent>,
}

impl LoadingGuard {
    /// Claim the flag, or `None` if a send already holds it
    fn acquire(loading: &Arc<AtomicBool>, events: &broadcast::Sender<ChatEvent>) -> Option<Self> {
        loading
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(Self {
            loading: Arc::clone(loading),
            events: events.clone(),
        })
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        self.loading.store(false, Ordering::SeqCst);
        let _ = self.events.send(ChatEvent::LoadingChanged { is_loading: false });
    }
}

/// A send whose user message is already appended, awaiting its reply.
///
/// Dropping it without calling [`ChatController::complete_send`] lowers the
/// loading flag and appends nothing further.
pub struct PendingSend {
    conversation_id: String,
    text: String,
    /// Session id as it was before the user message was appended
    session_id: Option<String>,
    _loading: LoadingGuard,
}

impl PendingSend {
    pub fn conversation_id(&self) -> &str {
        &self.conversation_id
    }
}

pub struct ChatController {
    store: Mutex<ConversationStore>,
    reply: Arc<dyn ReplyService>,
    credentials: Credentials,
    loading: Arc<AtomicBool>,
    events: broadcast::Sender<ChatEvent>,
}

impl ChatController {
    pub fn new(
        store: ConversationStore,
        reply: Arc<dyn ReplyService>,
        credentials: Credentials,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            store: Mutex::new(store),
            reply,
            credentials,
            loading: Arc::new(AtomicBool::new(false)),
            events,
        }
    }

    fn store(&self) -> MutexGuard<'_, ConversationStore> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self, event: ChatEvent) {
        // No subscribers is fine
        let _ = self.events.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::SeqCst)
    }

    pub fn is_authenticated(&self) -> bool {
        self.store().is_authenticated()
    }

    /// Lock the store, refusing if nobody is signed in
    fn signed_in_store(&self) -> Result<MutexGuard<'_, ConversationStore>, ChatError> {
        let store = self.store();
        if store.is_authenticated() {
            Ok(store)
        } else {
            Err(ChatError::NotAuthenticated)
        }
    }

    pub fn snapshot(&self) -> ChatSnapshot {
        let Ok(store) = self.signed_in_store() else {
            return ChatSnapshot::default();
        };
        ChatSnapshot {
            user: store.user().cloned(),
            conversations: store.conversations().to_vec(),
            current_conversation_id: store.current_id().map(String::from),
            is_loading: self.is_loading(),
        }
    }

    pub fn conversation(&self, id: &str) -> Result<Conversation, ChatError> {
        self.signed_in_store()?
            .get(id)
            .cloned()
            .ok_or_else(|| ChatError::ConversationNotFound(id.to_string()))
    }

    // ==================== Session ====================

    pub fn login(&self, username: &str, password: &str) -> Result<User, AuthError> {
        let user = self
            .credentials
            .authenticate(username, password)
            .inspect_err(|e| tracing::warn!(error = %e, "Login rejected"))?;

        self.store().set_user(Some(user.clone()));
        tracing::info!(username = %user.username, "User signed in");
        self.notify(ChatEvent::UserChanged {
            user: Some(user.clone()),
        });
        Ok(user)
    }

    /// Sign out and forget all local conversations
    pub fn logout(&self) {
        self.store().clear();
        tracing::info!("User signed out");
        self.notify(ChatEvent::UserChanged { user: None });
        self.notify(ChatEvent::ConversationsChanged { current_id: None });
    }

    // ==================== Conversations ====================

    pub fn create_conversation(&self) -> Result<String, ChatError> {
        let id = self.signed_in_store()?.create_conversation();
        tracing::info!(conversation_id = %id, "Conversation created");
        self.notify(ChatEvent::ConversationsChanged {
            current_id: Some(id.clone()),
        });
        Ok(id)
    }

    /// Returns whether the id was known
    pub fn select_conversation(&self, id: &str) -> Result<bool, ChatError> {
        let selected = self.signed_in_store()?.select_conversation(id);
        if selected {
            self.notify(ChatEvent::ConversationsChanged {
                current_id: Some(id.to_string()),
            });
        }
        Ok(selected)
    }

    pub fn delete_conversation(&self, id: &str) -> Result<(), ChatError> {
        let current_id = {
            let mut store = self.signed_in_store()?;
            store.delete_conversation(id);
            store.current_id().map(String::from)
        };
        tracing::info!(conversation_id = %id, "Conversation deleted");
        self.notify(ChatEvent::ConversationsChanged { current_id });
        Ok(())
    }

    // ==================== Sending ====================

    /// Send a message and wait for the assistant's answer
    pub async fn send_message(
        &self,
        chat_id: &str,
        content: &str,
    ) -> Result<SendOutcome, ChatError> {
        let pending = self.begin_send(chat_id, content)?;
        Ok(self.complete_send(pending).await)
    }

    /// Phase one: validate, raise the loading flag, append the user message
    pub fn begin_send(&self, chat_id: &str, content: &str) -> Result<PendingSend, ChatError> {
        let text = content.trim();
        let (message, session_id, loading) = {
            let mut store = self.signed_in_store()?;
            if text.is_empty() {
                return Err(ChatError::EmptyMessage);
            }
            let conv = store
                .get(chat_id)
                .ok_or_else(|| ChatError::ConversationNotFound(chat_id.to_string()))?;
            // Only one send may be pending
            let loading = LoadingGuard::acquire(&self.loading, &self.events)
                .ok_or(ChatError::Busy)?;

            let session_id = conv.session_id.clone();
            let new_title = conv
                .messages
                .is_empty()
                .then(|| title_from_first_message(text));

            let message = Message::user(text);
            store.append_messages(
                chat_id,
                vec![message.clone()],
                AppendOptions {
                    new_title,
                    new_session_id: None,
                },
            );
            (message, session_id, loading)
        };

        self.notify(ChatEvent::MessageAppended {
            conversation_id: chat_id.to_string(),
            message,
        });
        self.notify(ChatEvent::LoadingChanged { is_loading: true });

        Ok(PendingSend {
            conversation_id: chat_id.to_string(),
            text: text.to_string(),
            session_id,
            _loading: loading,
        })
    }

    /// Phase two: ask the reply service and append its answer.
    ///
    /// The loading flag is lowered when this returns, whichever branch ran.
    pub async fn complete_send(&self, pending: PendingSend) -> SendOutcome {
        let result = self
            .reply
            .send(&pending.text, pending.session_id.as_deref())
            .await;

        match result {
            Ok(reply) => {
                let message = Message::ai(reply.text);
                self.append_reply(
                    &pending.conversation_id,
                    message.clone(),
                    AppendOptions {
                        new_title: None,
                        new_session_id: reply.session_id,
                    },
                );
                SendOutcome::Replied(message)
            }
            Err(e) => {
                tracing::error!(
                    conversation_id = %pending.conversation_id,
                    error = %e,
                    kind = ?e.kind,
                    "Error generating reply"
                );
                let message = Message::ai(REPLY_ERROR_TEXT);
                self.append_reply(
                    &pending.conversation_id,
                    message.clone(),
                    AppendOptions::default(),
                );
                SendOutcome::Failed(message)
            }
        }
    }

    fn append_reply(&self, chat_id: &str, message: Message, options: AppendOptions) {
        let appended = self
            .store()
            .append_messages(chat_id, vec![message.clone()], options);
        if appended {
            self.notify(ChatEvent::MessageAppended {
                conversation_id: chat_id.to_string(),
                message,
            });
        } else {
            tracing::warn!(conversation_id = %chat_id, "Conversation removed before its reply arrived");
        }
    }
}
