//! Chat completion collaborators.
//!
//! The session engine only needs "history + new message in, reply text out".
//! [`HttpCompletion`] talks to the concierge AI gateway; [`EchoCompletion`]
//! answers locally for offline use and tests.

use crate::error::{CompletionError, CompletionResult};
use crate::session::HistoryTurn;
use crate::util::http_client;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

/// A chat-completion backend.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Backend name for logs.
    fn name(&self) -> &str;

    /// Produce the assistant reply to `new_message`.
    ///
    /// `history` holds the turns before `new_message`, oldest first.
    async fn complete(
        &self,
        history: &[HistoryTurn],
        new_message: &str,
        display_name: &str,
    ) -> CompletionResult<String>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatRequest<'a> {
    chat_history: &'a [HistoryTurn],
    user_message: &'a str,
    client_name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    response: String,
}

/// Client for the gateway's `/llm-chat` endpoint.
#[derive(Debug, Clone)]
pub struct HttpCompletion {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpCompletion {
    /// Create a client for the gateway at `base_url`.
    #[must_use]
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, Duration::from_secs(30))
    }

    /// Create a client with a request timeout.
    #[must_use]
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Self {
        let client = http_client(timeout);
        Self {
            client,
            endpoint: format!("{}/llm-chat", base_url.trim_end_matches('/')),
        }
    }

    /// Full URL requests are posted to.
    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatCompletion for HttpCompletion {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn complete(
        &self,
        history: &[HistoryTurn],
        new_message: &str,
        display_name: &str,
    ) -> CompletionResult<String> {
        let request = ChatRequest {
            chat_history: history,
            user_message: new_message,
            client_name: display_name,
        };

        debug!(turns = history.len(), endpoint = %self.endpoint, "requesting completion");

        let response = self
            .client
            .post(&self.endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| CompletionError::network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            return Err(CompletionError::Server {
                status: status.as_u16(),
                body,
            });
        }

        let reply: ChatResponse = response
            .json()
            .await
            .map_err(|e| CompletionError::Decode(e.to_string()))?;

        info!(reply_len = reply.response.len(), "completion received");
        Ok(reply.response)
    }
}

/// Offline backend that acknowledges each message.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoCompletion;

#[async_trait]
impl ChatCompletion for EchoCompletion {
    fn name(&self) -> &'static str {
        "echo"
    }

    async fn complete(
        &self,
        _history: &[HistoryTurn],
        new_message: &str,
        display_name: &str,
    ) -> CompletionResult<String> {
        Ok(format!("Thank you, {display_name}. You said: {new_message}"))
    }
}
