//! Data models and wire payloads for the chat client

use serde::{Deserialize, Serialize};

/// One entry in the pulled chat-list snapshot.
///
/// Direct chats carry the other participant in `participant`; group chats
/// carry the full `participants` list and `is_group`. The `timestamp` is
/// passed through from the backend but never interpreted: list order is
/// whatever the snapshot returns.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSummary {
    pub chat_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub participants: Option<Vec<String>>,
    #[serde(default)]
    pub is_group: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<f64>,
}

impl ChatSummary {
    /// Name shown for this chat: the other participant for a direct chat,
    /// the participants label annotated as a group otherwise.
    pub fn display_name(&self) -> String {
        if self.is_group {
            let label = match &self.participants {
                Some(names) => names.join(", "),
                None => self.participant.clone().unwrap_or_default(),
            };
            format!("{} (group)", label)
        } else {
            self.participant
                .clone()
                .or_else(|| {
                    self.participants
                        .as_ref()
                        .and_then(|names| names.first().cloned())
                })
                .unwrap_or_else(|| "unknown".to_string())
        }
    }

    /// Last message preview. The backend sends an empty string for a chat
    /// with no messages yet; both absent and empty mean "none".
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref().filter(|m| !m.is_empty())
    }
}

/// One message in a conversation, in client-observed append order.
/// Extra backend fields (`_id`, `chat_id`, `timestamp`) are ignored.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub sender: String,
    pub message: String,
}

/// Inbound push-channel events, discriminated by `type`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ServerEvent {
    #[serde(rename = "chat_created")]
    ChatCreated {
        chat_id: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participants: Option<Vec<String>>,
        #[serde(default)]
        is_group: bool,
    },
    #[serde(rename = "new_message")]
    NewMessage {
        chat_id: String,
        sender: String,
        message: String,
    },
    #[serde(rename = "error")]
    Error { message: String },
    /// Any frame with an unrecognized `type`. The dispatcher drops these
    /// without surfacing anything.
    #[serde(other)]
    Unknown,
}

/// Outbound push-channel commands, discriminated by `type`.
///
/// Sending is fire-and-forget: there is no acknowledgment, success is
/// inferred from the resulting `chat_created` or `new_message` event.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ClientCommand {
    #[serde(rename = "create_chat")]
    CreateChat {
        initiator: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participant: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        participants: Option<Vec<String>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        is_group: Option<bool>,
    },
    #[serde(rename = "send_message")]
    SendMessage {
        chat_id: String,
        sender: String,
        message: String,
    },
}

impl ClientCommand {
    /// Build a `create_chat` command: a single peer makes a direct chat,
    /// several peers make a group chat with the peers as an ordered list.
    pub fn create_chat(initiator: &str, peers: &[String]) -> Self {
        if peers.len() == 1 {
            ClientCommand::CreateChat {
                initiator: initiator.to_string(),
                participant: Some(peers[0].clone()),
                participants: None,
                is_group: None,
            }
        } else {
            ClientCommand::CreateChat {
                initiator: initiator.to_string(),
                participant: None,
                participants: Some(peers.to_vec()),
                is_group: Some(true),
            }
        }
    }
}

/// Command types for the CLI
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Register { username: String, password: String },
    Login { username: String, password: String },
    Logout,
    Chats,
    Open(String),
    Create(Vec<String>),
    Message(String),
    Quit,
}

impl Command {
    /// Parse a command string.
    ///
    /// `/register` and `/login` accept missing arguments as empty strings:
    /// credential validation (and its notice) belongs to the session layer,
    /// not the parser.
    pub fn parse(input: &str) -> Result<Self, String> {
        let input = input.trim();

        if input == "/quit" || input == "/exit" {
            return Ok(Command::Quit);
        }

        if input == "/logout" {
            return Ok(Command::Logout);
        }

        if input == "/chats" {
            return Ok(Command::Chats);
        }

        if input == "/register" || input.starts_with("/register ") {
            let (username, password) = split_credentials(&input["/register".len()..]);
            return Ok(Command::Register { username, password });
        }

        if input == "/login" || input.starts_with("/login ") {
            let (username, password) = split_credentials(&input["/login".len()..]);
            return Ok(Command::Login { username, password });
        }

        if let Some(target) = input.strip_prefix("/open ") {
            let target = target.trim();
            if target.is_empty() {
                return Err("Usage: /open <number|chat_id>".to_string());
            }
            return Ok(Command::Open(target.to_string()));
        }

        if let Some(rest) = input.strip_prefix("/create ") {
            let peers: Vec<String> = rest.split_whitespace().map(str::to_string).collect();
            if peers.is_empty() {
                return Err("Usage: /create <username> [username...]".to_string());
            }
            return Ok(Command::Create(peers));
        }

        if input == "/open" {
            return Err("Usage: /open <number|chat_id>".to_string());
        }

        if input == "/create" {
            return Err("Usage: /create <username> [username...]".to_string());
        }

        if input.starts_with('/') {
            return Err(format!("Unknown command: {}", input));
        }

        Ok(Command::Message(input.to_string()))
    }
}

fn split_credentials(rest: &str) -> (String, String) {
    let mut parts = rest.split_whitespace();
    let username = parts.next().unwrap_or_default().to_string();
    let password = parts.next().unwrap_or_default().to_string();
    (username, password)
}
