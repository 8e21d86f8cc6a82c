//! Chat list reconciliation
//!
//! Owns the ordered chat-list snapshot. The collection is only ever
//! replaced wholesale by the latest pull; there is no incremental patching
//! and therefore no merge path to get wrong.

use crate::models::ChatSummary;

#[derive(Debug, Default)]
pub struct ChatList {
    chats: Vec<ChatSummary>,
}

impl ChatList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the latest snapshot, discarding the previous one entirely.
    pub fn replace(&mut self, chats: Vec<ChatSummary>) {
        self.chats = chats;
    }

    pub fn clear(&mut self) {
        self.chats.clear();
    }

    /// Snapshot in backend order.
    pub fn chats(&self) -> &[ChatSummary] {
        &self.chats
    }

    /// 1-based position lookup, for `/open <number>`.
    pub fn get(&self, position: usize) -> Option<&ChatSummary> {
        position.checked_sub(1).and_then(|i| self.chats.get(i))
    }

    pub fn find(&self, chat_id: &str) -> Option<&ChatSummary> {
        self.chats.iter().find(|c| c.chat_id == chat_id)
    }

    pub fn is_empty(&self) -> bool {
        self.chats.is_empty()
    }

    pub fn len(&self) -> usize {
        self.chats.len()
    }
}
