use std::time::Duration;

use serde_json::json;
use tracing::{debug, info, warn};

use crate::{
    chunk::{self, MAX_MESSAGE_CHARS},
    client::{HistoryTurn, RelayClient},
    error::RelayError,
    transport::{ChatTransport, InboundMessage},
    trigger,
};

pub const APOLOGY: &str =
    "Sorry, the assistant could not be reached right now. Please try again later.";

#[derive(Debug, Clone)]
pub struct RelaySettings {
    pub max_chunk: usize,
    pub chunk_delay: Duration,
    pub history: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            max_chunk: MAX_MESSAGE_CHARS,
            chunk_delay: Duration::from_secs(1),
            history: 10,
        }
    }
}

/// Bridges a chat transport to the assistant endpoint.
pub struct Relay<T> {
    transport: T,
    client: RelayClient,
    settings: RelaySettings,
}

impl<T: ChatTransport> Relay<T> {
    pub fn new(transport: T, client: RelayClient, settings: RelaySettings) -> Self {
        Self {
            transport,
            client,
            settings,
        }
    }

    pub fn into_transport(self) -> T {
        self.transport
    }

    /// Process messages until the transport runs dry.
    pub async fn run(&mut self) -> Result<(), RelayError> {
        info!(endpoint = self.client.endpoint(), "Relay listening");
        while let Some(message) = self.transport.next_message().await? {
            if let Err(e) = self.handle(&message).await {
                warn!(chat = %message.chat_id, error = %e, "Failed to relay message");
            }
        }
        info!("Transport closed");
        Ok(())
    }

    /// Answer one message. Returns whether it was addressed to the assistant.
    pub async fn handle(&mut self, message: &InboundMessage) -> Result<bool, RelayError> {
        if message.from_self || !trigger::is_addressed(&message.body) {
            return Ok(false);
        }

        let command = trigger::extract_command(&message.body);
        info!(chat = %message.chat_id, sender = %message.sender, "Assistant request");

        let history = self.history_for(message).await;
        let context_data = json!({
            "isGroup": message.is_group,
            "from": message.sender,
            "timestamp": message.timestamp,
        });

        let reply = match self.client.ask(&command, &history, &context_data).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "Chat endpoint failed");
                APOLOGY.to_string()
            }
        };

        self.send_chunked(message, &reply).await?;
        Ok(true)
    }

    async fn history_for(&mut self, message: &InboundMessage) -> Vec<HistoryTurn> {
        match self
            .transport
            .recent_messages(&message.chat_id, message, self.settings.history)
            .await
        {
            Ok(recent) => recent
                .into_iter()
                .filter(|m| !m.from_self)
                .map(|m| HistoryTurn::user(m.body))
                .collect(),
            Err(e) => {
                debug!(error = %e, "No chat history available");
                Vec::new()
            }
        }
    }

    async fn send_chunked(&mut self, to: &InboundMessage, reply: &str) -> Result<(), RelayError> {
        let parts = chunk::split_numbered(reply, self.settings.max_chunk);
        let last = parts.len().saturating_sub(1);

        for (i, part) in parts.iter().enumerate() {
            self.transport.reply(to, part).await?;
            if i < last {
                tokio::time::sleep(self.settings.chunk_delay).await;
            }
        }
        Ok(())
    }
}
