//! Conversation store
//!
//! Authoritative in-memory list of conversations plus the current
//! selection. Every mutation writes the user record and the full list
//! through to the local store before returning.

use super::ids::ConversationIds;
use super::types::{now_millis, AppendOptions, Conversation, Message, User};
use crate::store::{LocalStore, StoreError, CHATS_KEY, USER_KEY};
use serde::de::DeserializeOwned;

pub struct ConversationStore {
    local: LocalStore,
    user: Option<User>,
    /// Newest first
    conversations: Vec<Conversation>,
    current_id: Option<String>,
    ids: ConversationIds,
}

impl ConversationStore {
    /// Restore user and conversations from the local store.
    ///
    /// The head of the list becomes the current conversation.
    pub fn load(local: LocalStore) -> Self {
        let user = read_record::<Option<User>>(&local, USER_KEY).flatten();
        let conversations: Vec<Conversation> = read_record(&local, CHATS_KEY).unwrap_or_default();
        let ids = ConversationIds::seeded(conversations.iter().map(|c| c.id.as_str()));
        let current_id = conversations.first().map(|c| c.id.clone());

        tracing::info!(
            conversations = conversations.len(),
            signed_in = user.is_some(),
            "Conversation store loaded"
        );

        Self {
            local,
            user,
            conversations,
            current_id,
            ids,
        }
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.as_ref().is_some_and(|u| u.is_authenticated)
    }

    pub fn set_user(&mut self, user: Option<User>) {
        self.user = user;
        self.persist();
    }

    pub fn conversations(&self) -> &[Conversation] {
        &self.conversations
    }

    pub fn current_id(&self) -> Option<&str> {
        self.current_id.as_deref()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.conversations.iter().find(|c| c.id == id)
    }

    /// Insert an empty conversation at the head of the list and select it
    pub fn create_conversation(&mut self) -> String {
        let id = self.ids.next_id();
        self.conversations.insert(0, Conversation::new(id.clone()));
        self.current_id = Some(id.clone());
        self.persist();
        id
    }

    /// Select a conversation. Unknown ids leave the selection untouched.
    pub fn select_conversation(&mut self, id: &str) -> bool {
        if self.get(id).is_none() {
            tracing::debug!(conversation_id = %id, "Ignoring selection of unknown conversation");
            return false;
        }
        self.current_id = Some(id.to_string());
        true
    }

    /// Remove a conversation. If it was current, the first remaining
    /// conversation (or none) becomes current.
    pub fn delete_conversation(&mut self, id: &str) {
        self.conversations.retain(|c| c.id != id);
        if self.current_id.as_deref() == Some(id) {
            self.current_id = self.conversations.first().map(|c| c.id.clone());
        }
        self.persist();
    }

    /// Append messages to a conversation in one step.
    ///
    /// The title is only replaced if the conversation was empty before this
    /// call, and the session id only while it is still unset. Returns false
    /// (and changes nothing) if the conversation does not exist.
    pub fn append_messages(
        &mut self,
        chat_id: &str,
        messages: Vec<Message>,
        options: AppendOptions,
    ) -> bool {
        let Some(conv) = self.conversations.iter_mut().find(|c| c.id == chat_id) else {
            tracing::debug!(conversation_id = %chat_id, "Ignoring append to unknown conversation");
            return false;
        };

        let was_empty = conv.messages.is_empty();
        conv.messages.extend(messages);
        conv.updated_at = now_millis();

        if let Some(title) = options.new_title {
            if was_empty {
                conv.title = title;
            }
        }
        if let Some(session_id) = options.new_session_id {
            if conv.session_id.is_none() {
                tracing::info!(conversation_id = %chat_id, session_id = %session_id, "Session established");
                conv.session_id = Some(session_id);
            }
        }

        self.persist();
        true
    }

    /// Forget the user, every conversation and the selection, and delete
    /// both records from the local store
    pub fn clear(&mut self) {
        self.user = None;
        self.conversations.clear();
        self.current_id = None;

        let removed = self
            .local
            .remove(USER_KEY)
            .and_then(|()| self.local.remove(CHATS_KEY));
        if let Err(e) = removed {
            tracing::error!(error = %e, "Failed to delete stored records");
        }
    }

    fn persist(&self) {
        if let Err(e) = self.write_records() {
            tracing::error!(error = %e, "Failed to persist conversations");
        }
    }

    fn write_records(&self) -> Result<(), StoreError> {
        self.local.put(USER_KEY, &self.user)?;
        self.local.put(CHATS_KEY, &self.conversations)?;
        Ok(())
    }
}

/// Read a record, treating undecodable values as absent
fn read_record<T: DeserializeOwned>(local: &LocalStore, key: &str) -> Option<T> {
    match local.get(key) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(key, error = %e, "Discarding unreadable record");
            None
        }
    }
}
