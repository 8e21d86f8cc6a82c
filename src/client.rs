/// Main chat client orchestrator
///
/// Owns the session, the push channel, and both reconcilers, and routes
/// every inbound event through the dispatch table. All failure paths end
/// in a notice or a session reset; none escape.

use crate::api::ServerApi;
use crate::chat_list::ChatList;
use crate::cli;
use crate::conversation::Conversation;
use crate::error::Result;
use crate::models::{ChatSummary, ClientCommand, Command, ServerEvent};
use crate::notify::{NoticeKind, Notifier};
use crate::session::Session;
use crate::websocket::EventStream;
use tokio::io::BufReader;
use tokio::time::Instant;

/// Notice shown when a credential field is empty. Surfaced locally,
/// before any network call.
pub const MISSING_CREDENTIALS: &str = "Please enter both username and password";

/// One loop turn: the three suspension points of the client.
enum Step {
    Input(Option<String>),
    Event(Result<Option<ServerEvent>>),
    NoticeExpired,
}

/// Main chat client
pub struct ChatClient {
    api: ServerApi,
    session: Session,
    chats: ChatList,
    conversation: Conversation,
    notifier: Notifier,
    channel: Option<EventStream>,
}

impl ChatClient {
    /// Create a client against a server base URL, logged out.
    pub fn new(server_url: &str) -> Self {
        Self {
            api: ServerApi::new(server_url),
            session: Session::new(),
            chats: ChatList::new(),
            conversation: Conversation::new(),
            notifier: Notifier::new(),
            channel: None,
        }
    }

    /// Create an account. Does not log in.
    pub async fn register(&mut self, username: &str, password: &str) {
        if username.is_empty() || password.is_empty() {
            self.notifier.show(MISSING_CREDENTIALS, NoticeKind::Error);
            return;
        }

        match self.api.register(username, password).await {
            Ok(()) => self.notifier.show(
                "Registration successful. You can now log in.",
                NoticeKind::Success,
            ),
            Err(e) => self.notifier.show(e.to_string(), NoticeKind::Error),
        }
    }

    /// Log in and, on success, open the push channel with the returned
    /// token as the addressing credential.
    pub async fn login(&mut self, username: &str, password: &str) {
        if username.is_empty() || password.is_empty() {
            self.notifier.show(MISSING_CREDENTIALS, NoticeKind::Error);
            return;
        }

        match self.api.login(username, password).await {
            Ok(credentials) => {
                self.session.begin(credentials.username, credentials.token);
                self.connect_channel().await;
            }
            Err(e) => self.notifier.show(e.to_string(), NoticeKind::Error),
        }
    }

    /// Log out: clear the session, drop the channel, empty every view.
    pub fn logout(&mut self) {
        self.reset_state();
        self.notifier.clear();
    }

    async fn connect_channel(&mut self) {
        let token = match self.session.token() {
            Some(token) => token.to_string(),
            None => return,
        };

        match EventStream::connect(self.api.base_url(), &token).await {
            Ok(channel) => {
                self.channel = Some(channel);
                self.session.mark_connected();
                // Channel open triggers the initial full chat-list pull.
                self.refresh_chats().await;
            }
            // Open-time failure is fatal for the session, same as a live
            // channel error. No retry, no backoff.
            Err(e) => self.fail_session(&e.to_string()),
        }
    }

    /// Wholesale chat-list refresh from the latest snapshot. A failed
    /// pull surfaces a notice and leaves the channel up.
    pub async fn refresh_chats(&mut self) {
        let username = match self.session.username() {
            Some(username) => username.to_string(),
            None => return,
        };

        match self.api.fetch_user_chats(&username).await {
            Ok(snapshot) => self.chats.replace(snapshot),
            Err(e) => self.notifier.show(e.to_string(), NoticeKind::Error),
        }
    }

    /// Open a conversation and pull its full history. The history lands
    /// through the reconciler's chat-id guard, so a response that arrives
    /// after the user navigated elsewhere is dropped.
    pub async fn open_chat(&mut self, chat_id: &str, display_name: &str) {
        self.conversation
            .open(chat_id.to_string(), display_name.to_string());

        match self.api.fetch_chat_messages(chat_id).await {
            Ok(history) => {
                self.conversation.install_history(chat_id, history);
            }
            Err(e) => self.notifier.show(e.to_string(), NoticeKind::Error),
        }
    }

    /// Start a chat with one peer (direct) or several (group).
    pub fn create_chat(&mut self, peers: Vec<String>) {
        let initiator = match self.session.username() {
            Some(username) => username.to_string(),
            None => {
                self.notifier.show("Not logged in", NoticeKind::Error);
                return;
            }
        };
        if peers.is_empty() {
            return;
        }

        self.send_command(ClientCommand::create_chat(&initiator, &peers));
    }

    /// Send a message to the open conversation. Fire-and-forget: the
    /// message renders when its `new_message` echo comes back.
    pub fn send_message(&mut self, text: &str) {
        let sender = match self.session.username() {
            Some(username) => username.to_string(),
            None => {
                self.notifier.show("Not logged in", NoticeKind::Error);
                return;
            }
        };
        let chat_id = match self.conversation.chat_id() {
            Some(chat_id) => chat_id.to_string(),
            None => {
                self.notifier.show("Open a chat first", NoticeKind::Error);
                return;
            }
        };

        self.send_command(ClientCommand::SendMessage {
            chat_id,
            sender,
            message: text.to_string(),
        });
    }

    fn send_command(&mut self, command: ClientCommand) {
        let result = match &self.channel {
            Some(channel) => channel.send(&command),
            None => {
                self.notifier.show("Not connected", NoticeKind::Error);
                return;
            }
        };

        if let Err(e) = result {
            self.fail_session(&e.to_string());
        }
    }

    /// Route one inbound event. Invoked once per frame, state-independent:
    ///
    /// - `chat_created`: refresh the chat list, then open the new chat
    /// - `new_message`: append to the open conversation if it matches,
    ///   then refresh the chat list regardless
    /// - `error`: surface the message
    /// - anything else: drop
    pub async fn dispatch_event(&mut self, event: ServerEvent) {
        match event {
            ServerEvent::ChatCreated {
                chat_id,
                participant,
                participants,
                is_group,
            } => {
                self.refresh_chats().await;

                let summary = ChatSummary {
                    chat_id: chat_id.clone(),
                    participant,
                    participants,
                    is_group,
                    last_message: None,
                    timestamp: None,
                };
                let display_name = summary.display_name();
                self.open_chat(&chat_id, &display_name).await;
                println!("{}", cli::format_conversation(&self.conversation));
            }
            ServerEvent::NewMessage {
                chat_id,
                sender,
                message,
            } => {
                let appended = self.conversation.append_if_open(&chat_id, &sender, &message);
                if appended {
                    if let Some(name) = self.conversation.display_name() {
                        println!("{}", cli::format_message(name, &sender, &message));
                    }
                }
                // Every message refreshes the list, open chat or not: the
                // summary of whichever chat it landed in changed.
                self.refresh_chats().await;
            }
            ServerEvent::Error { message } => {
                self.notifier.show(message, NoticeKind::Error);
            }
            ServerEvent::Unknown => {
                log::debug!("Ignoring unrecognized event type");
            }
        }
    }

    /// Terminal transport failure: tear the session down, then surface
    /// the reason. Order matters; the reset must not eat the notice.
    fn fail_session(&mut self, reason: &str) {
        log::warn!("Session terminated: {}", reason);
        self.reset_state();
        self.notifier.show(reason, NoticeKind::Error);
    }

    fn reset_state(&mut self) {
        self.session.reset();
        // Dropping the handle closes the socket and ends the pumps.
        self.channel = None;
        self.chats.clear();
        self.conversation.close();
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn chats(&self) -> &ChatList {
        &self.chats
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Run the interactive loop: stdin commands, channel events, and the
    /// notice timer, multiplexed on one task.
    pub async fn run(&mut self) -> Result<()> {
        println!("Commands: /register, /login, /logout, /chats, /open, /create, /quit");

        let (line_tx, mut line_rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        tokio::spawn(async move {
            let mut reader = BufReader::new(tokio::io::stdin());
            loop {
                match cli::read_line_async(&mut reader).await {
                    Ok(Some(line)) => {
                        if line_tx.send(line).is_err() {
                            break;
                        }
                    }
                    Ok(None) | Err(_) => break,
                }
            }
        });

        let mut printed_seq = self.notifier.seq();

        loop {
            let deadline = self.notifier.deadline();

            let step = tokio::select! {
                line = line_rx.recv() => Step::Input(line),
                event = Self::next_channel_event(self.channel.as_mut()) => Step::Event(event),
                _ = Self::notice_expiry(deadline) => Step::NoticeExpired,
            };

            match step {
                Step::Input(None) => break,
                Step::Input(Some(line)) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    match Command::parse(line) {
                        Ok(Command::Quit) => break,
                        Ok(command) => self.handle_command(command).await,
                        Err(usage) => println!("{}", usage),
                    }
                }
                Step::Event(Ok(Some(event))) => self.dispatch_event(event).await,
                Step::Event(Ok(None)) => self.fail_session("Connection closed"),
                Step::Event(Err(e)) => self.fail_session(&e.to_string()),
                Step::NoticeExpired => self.notifier.expire(),
            }

            if self.notifier.seq() != printed_seq {
                printed_seq = self.notifier.seq();
                if let Some(notice) = self.notifier.current() {
                    println!("{}", cli::format_notice(notice));
                }
            }
        }

        Ok(())
    }

    async fn handle_command(&mut self, command: Command) {
        match command {
            Command::Register { username, password } => {
                self.register(&username, &password).await;
            }
            Command::Login { username, password } => {
                self.login(&username, &password).await;
                if self.session.is_connected() {
                    println!("{}", cli::format_chat_list(&self.chats));
                }
            }
            Command::Logout => {
                self.logout();
                println!("Logged out");
            }
            Command::Chats => {
                println!("{}", cli::format_chat_list(&self.chats));
            }
            Command::Open(target) => {
                let selected = match target.parse::<usize>() {
                    Ok(position) => self.chats.get(position).cloned(),
                    Err(_) => self.chats.find(&target).cloned(),
                };
                match selected {
                    Some(chat) => {
                        let display_name = chat.display_name();
                        self.open_chat(&chat.chat_id, &display_name).await;
                        println!("{}", cli::format_conversation(&self.conversation));
                    }
                    None => {
                        self.notifier
                            .show(format!("No such chat: {}", target), NoticeKind::Error);
                    }
                }
            }
            Command::Create(peers) => self.create_chat(peers),
            Command::Message(text) => self.send_message(&text),
            Command::Quit => {}
        }
    }

    async fn next_channel_event(
        channel: Option<&mut EventStream>,
    ) -> Result<Option<ServerEvent>> {
        match channel {
            Some(channel) => channel.next_event().await,
            None => std::future::pending().await,
        }
    }

    async fn notice_expiry(deadline: Option<Instant>) {
        match deadline {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending().await,
        }
    }
}
