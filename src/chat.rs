//! Conversation model and store

mod conversations;
mod ids;
mod title;
mod types;

#[cfg(test)]
mod proptests;

pub use conversations::ConversationStore;
pub use title::title_from_first_message;
pub use types::{AppendOptions, Conversation, Message, User};
#[allow(unused_imports)] // Used by tests
pub use types::{Sender, DEFAULT_TITLE};
