use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, error, info};
use ts_rs::TS;

use super::{
    ai_client::{ChatCompletionProvider, ChatMessage, ChatProviderError, ChatRequest, Usage},
    intent::{self, Intent},
    prompts::{self, DEFAULT_SECTION},
};

pub const TEMPERATURE: f32 = 0.7;
pub const MAX_TOKENS: u32 = 1500;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Message is required")]
    EmptyMessage,
    #[error(transparent)]
    Provider(#[from] ChatProviderError),
}

/// Speaker of a prior conversation turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ChatTurn {
    pub role: TurnRole,
    pub content: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    #[ts(optional)]
    pub kind: Option<String>,
}

impl ChatTurn {
    fn into_message(self) -> ChatMessage {
        match self.role {
            TurnRole::User => ChatMessage::user(self.content),
            TurnRole::Assistant => ChatMessage::assistant(self.content),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
pub struct AssistantChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub context: Vec<ChatTurn>,
    pub current_section: Option<String>,
    /// Opaque caller data, accepted for compatibility.
    #[ts(type = "unknown")]
    pub context_data: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct ReplyMetadata {
    pub timestamp: DateTime<Utc>,
    pub model: String,
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Serialize, Deserialize, TS)]
pub struct AssistantReply {
    pub response: String,
    #[serde(rename = "type")]
    pub intent: Intent,
    pub metadata: ReplyMetadata,
}

#[derive(Clone)]
pub struct AssistantService {
    provider: Arc<dyn ChatCompletionProvider>,
}

impl AssistantService {
    pub fn new(provider: Arc<dyn ChatCompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn provider_name(&self) -> &'static str {
        self.provider.name()
    }

    /// Messages sent upstream: system prompt, prior turns, then the new message.
    pub fn build_messages(request: AssistantChatRequest, intent: Intent) -> Vec<ChatMessage> {
        let section = request
            .current_section
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_SECTION);

        let mut messages = Vec::with_capacity(request.context.len() + 2);
        messages.push(ChatMessage::system(prompts::system_prompt(intent, section)));
        messages.extend(request.context.into_iter().map(ChatTurn::into_message));
        messages.push(ChatMessage::user(request.message));
        messages
    }

    /// Classify, prompt and forward one message. A single upstream attempt.
    pub async fn chat(&self, request: AssistantChatRequest) -> Result<AssistantReply, AssistantError> {
        if request.message.trim().is_empty() {
            return Err(AssistantError::EmptyMessage);
        }

        let intent = intent::classify(&request.message);
        debug!(
            %intent,
            turns = request.context.len(),
            section = ?request.current_section,
            has_context_data = request.context_data.is_some(),
            "Assistant request"
        );

        let messages = Self::build_messages(request, intent);
        let completion = self
            .provider
            .complete(ChatRequest {
                messages,
                temperature: TEMPERATURE,
                max_tokens: MAX_TOKENS,
            })
            .await
            .map_err(|e| {
                error!(provider = self.provider.name(), error = %e, "Chat completion failed");
                e
            })?;

        info!(%intent, model = %completion.model, "Assistant replied");
        Ok(AssistantReply {
            response: completion.content,
            intent,
            metadata: ReplyMetadata {
                timestamp: Utc::now(),
                model: completion.model,
                usage: completion.usage,
            },
        })
    }
}
