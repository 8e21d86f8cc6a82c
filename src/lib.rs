/// Live Chat Client Library
/// Keeps a live view of a user's conversations by reconciling pulled
/// snapshots with push-channel events.

pub mod api;
pub mod chat_list;
pub mod cli;
pub mod client;
pub mod conversation;
pub mod error;
pub mod models;
pub mod notify;
pub mod session;
pub mod websocket;

pub use client::ChatClient;
pub use error::{ClientError, Result};
