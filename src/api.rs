//! Server API client for REST endpoints
//!
//! On-demand pulls: full chat list, full message history, plus the
//! register/login calls. Pull failures are independent of the push
//! channel's health; callers surface them as notices and move on.

use crate::error::{ClientError, Result};
use crate::models::{ChatSummary, Message};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server API client
pub struct ServerApi {
    client: Client,
    base_url: String,
}

#[derive(Serialize)]
struct CredentialsRequest<'a> {
    username: &'a str,
    password: &'a str,
}

/// Credentials returned by a successful login.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub username: String,
    pub token: String,
}

#[derive(Deserialize)]
struct ErrorDetail {
    detail: String,
}

impl ServerApi {
    /// Create a new server API client
    pub fn new(base_url: &str) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, username: &str, password: &str) -> Result<()> {
        let request = CredentialsRequest { username, password };

        let response = self
            .client
            .post(format!("{}/register", self.base_url))
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            log::info!("User {} registered with server", username);
            Ok(())
        } else {
            Err(Self::rejection(response, "Registration failed").await)
        }
    }

    /// Exchange credentials for a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<LoginResponse> {
        let request = CredentialsRequest { username, password };

        let response = self
            .client
            .post(format!("{}/login", self.base_url))
            .json(&request)
            .send()
            .await?;

        if response.status().is_success() {
            let credentials: LoginResponse = response.json().await?;
            log::info!("Logged in as {}", credentials.username);
            Ok(credentials)
        } else {
            Err(Self::rejection(response, "Login failed").await)
        }
    }

    /// Pull the full chat list for a user. No pagination, no filtering.
    pub async fn fetch_user_chats(&self, username: &str) -> Result<Vec<ChatSummary>> {
        let response = self
            .client
            .get(format!("{}/user-chats/{}", self.base_url, username))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::rejection(response, "Failed to load chats").await)
        }
    }

    /// Pull the full message history for one chat. No windowing.
    pub async fn fetch_chat_messages(&self, chat_id: &str) -> Result<Vec<Message>> {
        let response = self
            .client
            .get(format!("{}/chat-messages/{}", self.base_url, chat_id))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(response.json().await?)
        } else {
            Err(Self::rejection(response, "Failed to load messages").await)
        }
    }

    /// Turn a non-success response into a rejection, preferring the
    /// backend's `detail` text over the generic fallback.
    async fn rejection(response: Response, fallback: &str) -> ClientError {
        match response.json::<ErrorDetail>().await {
            Ok(body) => ClientError::Rejected(body.detail),
            Err(_) => ClientError::Rejected(fallback.to_string()),
        }
    }
}
