//! CLI interface for the chat client
//!
//! Command parsing lives in `models::Command`; this module holds the
//! render boundary (pure formatting functions from reconciler state to
//! text) and async stdin reading for concurrent I/O in the main loop.

use crate::chat_list::ChatList;
use crate::conversation::Conversation;
use crate::error::Result;
use crate::notify::{Notice, NoticeKind};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Format a message line for display
pub fn format_message(display_name: &str, sender: &str, text: &str) -> String {
    format!("#{} <{}> {}", display_name, sender, text)
}

/// Format a control message for display
pub fn format_control(context: &str, action: &str) -> String {
    format!("#{} {}", context, action)
}

/// Format a notice for display
pub fn format_notice(notice: &Notice) -> String {
    match notice.kind {
        NoticeKind::Success => format!("[ok] {}", notice.text),
        NoticeKind::Error => format!("[error] {}", notice.text),
    }
}

/// Render the chat list, numbered for `/open <number>`.
pub fn format_chat_list(chats: &ChatList) -> String {
    if chats.is_empty() {
        return "(no chats yet)".to_string();
    }

    let mut out = String::new();
    for (i, chat) in chats.chats().iter().enumerate() {
        let preview = chat.last_message().unwrap_or("(no messages)");
        out.push_str(&format!("{}. {} - {}\n", i + 1, chat.display_name(), preview));
    }
    out.pop();
    out
}

/// Render the open conversation, latest message last.
pub fn format_conversation(conversation: &Conversation) -> String {
    let name = match conversation.display_name() {
        Some(name) => name,
        None => return "(no chat open)".to_string(),
    };

    let mut out = format!("--- {} ---", name);
    for msg in conversation.messages() {
        out.push('\n');
        out.push_str(&format_message(name, &msg.sender, &msg.message));
    }
    out
}

/// Async stdin reader that yields one line at a time
///
/// Prints the prompt and flushes stdout before blocking on input.
///
/// # Returns
/// - `Ok(Some(line))` - User entered a line
/// - `Ok(None)` - EOF reached (Ctrl+D)
/// - `Err(e)` - I/O error
pub async fn read_line_async(reader: &mut BufReader<tokio::io::Stdin>) -> Result<Option<String>> {
    use std::io::stdout;

    print!("> ");
    let _ = stdout().flush();

    let mut line = String::new();
    match reader.read_line(&mut line).await {
        Ok(0) => Ok(None), // EOF
        Ok(_) => {
            if line.ends_with('\n') {
                line.pop();
                if line.ends_with('\r') {
                    line.pop();
                }
            }
            Ok(Some(line))
        }
        Err(e) => Err(e.into()),
    }
}
