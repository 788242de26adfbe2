//! Conversation id generation
//!
//! Ids are decimal millisecond timestamps, bumped past the last issued id
//! so two conversations created in the same millisecond still differ.

use super::types::now_millis;

#[derive(Debug, Default)]
pub struct ConversationIds {
    last: i64,
}

impl ConversationIds {
    /// Seed from ids already in use so a restart never reissues one
    pub fn seeded<'a>(existing: impl IntoIterator<Item = &'a str>) -> Self {
        let last = existing
            .into_iter()
            .filter_map(|id| id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        Self { last }
    }

    pub fn next_id(&mut self) -> String {
        self.next_at(now_millis())
    }

    fn next_at(&mut self, now: i64) -> String {
        let id = now.max(self.last.saturating_add(1));
        self.last = id;
        id.to_string()
    }
}
