/// WebSocket event channel for real-time updates
///
/// One logical bidirectional stream per connected session. Inbound frames
/// become typed `ServerEvent`s; outbound `ClientCommand`s become frames.
/// A channel error is terminal for the session: there is no reconnection.

use crate::error::{ClientError, Result};
use crate::models::{ClientCommand, ServerEvent};
use futures::{SinkExt, StreamExt};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use url::Url;

/// Push-channel handle for one session.
pub struct EventStream {
    sender: futures::channel::mpsc::UnboundedSender<Message>,
    receiver: futures::channel::mpsc::UnboundedReceiver<Message>,
}

impl EventStream {
    /// Open the channel, addressed by the session token.
    pub async fn connect(server_url: &str, token: &str) -> Result<Self> {
        let url = Self::channel_url(server_url, token)?;

        let (ws_stream, _) = connect_async(&url).await?;
        let (mut write, mut read) = ws_stream.split();

        let (tx, mut rx) = futures::channel::mpsc::unbounded::<Message>();
        let (tx_in, rx_in) = futures::channel::mpsc::unbounded::<Message>();

        // Outgoing pump: frames queued by `send` go to the socket.
        tokio::spawn(async move {
            while let Some(msg) = rx.next().await {
                if let Err(e) = write.send(msg).await {
                    log::error!("Failed to send WebSocket frame: {}", e);
                    break;
                }
            }
        });

        // Incoming pump: socket frames are forwarded to the receiver.
        tokio::spawn(async move {
            while let Some(msg) = read.next().await {
                match msg {
                    Ok(msg) => {
                        if tx_in.unbounded_send(msg).is_err() {
                            break;
                        }
                    }
                    Err(e) => {
                        log::error!("WebSocket read failed: {}", e);
                        break;
                    }
                }
            }
        });

        Ok(Self {
            sender: tx,
            receiver: rx_in,
        })
    }

    /// Derive the channel address from the HTTP base URL.
    fn channel_url(server_url: &str, token: &str) -> Result<String> {
        let url = Url::parse(server_url)?;
        let host = url
            .host_str()
            .ok_or_else(|| ClientError::Transport("server URL has no host".to_string()))?;
        let scheme = if url.scheme() == "https" { "wss" } else { "ws" };

        Ok(match url.port() {
            Some(port) => format!("{}://{}:{}/ws/{}", scheme, host, port, token),
            None => format!("{}://{}/ws/{}", scheme, host, token),
        })
    }

    /// Queue a command frame. Fire-and-forget: no acknowledgment exists,
    /// success is inferred from the resulting event.
    pub fn send(&self, command: &ClientCommand) -> Result<()> {
        let json = serde_json::to_string(command)?;
        self.sender
            .unbounded_send(Message::Text(json.into()))
            .map_err(|_| ClientError::Transport("channel closed".to_string()))
    }

    /// Next typed event.
    ///
    /// Returns `Ok(None)` when the channel is gone. Frames that fail to
    /// parse are skipped with a log line; the `type` discrimination maps
    /// unrecognized tags to `ServerEvent::Unknown` for the dispatcher to
    /// drop.
    pub async fn next_event(&mut self) -> Result<Option<ServerEvent>> {
        while let Some(msg) = self.receiver.next().await {
            match msg {
                Message::Text(text) => match serde_json::from_str::<ServerEvent>(&text) {
                    Ok(event) => return Ok(Some(event)),
                    Err(e) => {
                        log::warn!("Skipping malformed frame: {}", e);
                    }
                },
                Message::Close(_) => return Ok(None),
                _ => {}
            }
        }
        Ok(None)
    }
}
