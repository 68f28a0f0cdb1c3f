use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::RelayError;

pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:3000/api/ai-assistant/chat";
/// Section name the assistant sees for relayed messages.
pub const RELAY_SECTION: &str = "whatsapp";

/// A prior chat message forwarded as context.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryTurn {
    pub role: &'static str,
    pub content: String,
}

impl HistoryTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user",
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ChatPayload<'a> {
    message: &'a str,
    context: &'a [HistoryTurn],
    current_section: &'static str,
    context_data: &'a Value,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    response: Option<String>,
    message: Option<String>,
}

/// HTTP client for the assistant chat endpoint.
#[derive(Debug, Clone)]
pub struct RelayClient {
    http: reqwest::Client,
    endpoint: String,
}

impl RelayClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, RelayError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("second-brain-relay/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            http,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send one command with its history and return the reply text.
    pub async fn ask(
        &self,
        command: &str,
        history: &[HistoryTurn],
        context_data: &Value,
    ) -> Result<String, RelayError> {
        let payload = ChatPayload {
            message: command,
            context: history,
            current_section: RELAY_SECTION,
            context_data,
        };

        let res = self.http.post(&self.endpoint).json(&payload).send().await?;
        let status = res.status();
        if !status.is_success() {
            return Err(RelayError::Status {
                status: status.as_u16(),
            });
        }

        let reply: ChatReply = res.json().await?;
        reply
            .response
            .or(reply.message)
            .filter(|text| !text.trim().is_empty())
            .ok_or(RelayError::EmptyResponse)
    }
}
