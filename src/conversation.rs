//! Open-conversation reconciliation
//!
//! At most one conversation is open at a time. Pulled history is installed
//! wholesale; pushed messages append only while their chat is the open one.
//! A message for a closed chat is dropped, not buffered: the next `open`
//! pulls full history from the backend, so nothing is lost, only deferred.

use crate::models::Message;

#[derive(Debug, Default)]
pub struct Conversation {
    chat_id: Option<String>,
    display_name: Option<String>,
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Switch the open conversation. Clears the previous message view;
    /// history arrives separately via `install_history`.
    pub fn open(&mut self, chat_id: String, display_name: String) {
        self.chat_id = Some(chat_id);
        self.display_name = Some(display_name);
        self.messages.clear();
    }

    /// Install a pulled history snapshot.
    ///
    /// The snapshot lands only if `for_chat` is still the open chat: a
    /// history response that resolves after the user navigated away must
    /// never overwrite the newer view.
    pub fn install_history(&mut self, for_chat: &str, messages: Vec<Message>) -> bool {
        if self.chat_id.as_deref() == Some(for_chat) {
            self.messages = messages;
            true
        } else {
            log::debug!("Dropping stale history for chat {}", for_chat);
            false
        }
    }

    /// Append a pushed message iff it targets the open chat.
    pub fn append_if_open(&mut self, chat_id: &str, sender: &str, message: &str) -> bool {
        if self.chat_id.as_deref() == Some(chat_id) {
            self.messages.push(Message {
                sender: sender.to_string(),
                message: message.to_string(),
            });
            true
        } else {
            false
        }
    }

    /// Close whatever is open.
    pub fn close(&mut self) {
        self.chat_id = None;
        self.display_name = None;
        self.messages.clear();
    }

    pub fn chat_id(&self) -> Option<&str> {
        self.chat_id.as_deref()
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn is_open(&self) -> bool {
        self.chat_id.is_some()
    }
}
