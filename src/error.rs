/// Error types for the chat client.
/// Every failure path ends in either a notice or a session reset; nothing
/// escapes a component boundary uncaught.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// Local input validation failed. Never reaches the network.
    #[error("{0}")]
    Validation(String),

    /// The backend rejected the request. Carries the server-provided
    /// detail text when present, a generic fallback otherwise.
    #[error("{0}")]
    Rejected(String),

    /// Push-channel failure. Fatal for the session.
    #[error("Connection error: {0}")]
    Transport(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid server URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ClientError>;
