//! Chat-completion providers for the assistant.

use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use ts_rs::TS;

use super::config::AiConfig;

pub const FALLBACK_MODEL: &str = "fallback-mode";

#[derive(Debug, Clone, Error)]
pub enum ChatProviderError {
    #[error("network error: {0}")]
    Transport(String),
    #[error("timeout")]
    Timeout,
    #[error("http {status}: {body}")]
    Http { status: u16, body: String },
    #[error("rate limited")]
    RateLimited,
    #[error("invalid api key")]
    InvalidApiKey,
    #[error("json error: {0}")]
    Serde(String),
    #[error("provider returned no choices")]
    NoChoices,
    #[error("provider returned an empty message")]
    EmptyContent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Token accounting as reported by the provider, passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u32,
    #[serde(default)]
    pub completion_tokens: u32,
    #[serde(default)]
    pub total_tokens: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChatCompletion {
    pub content: String,
    pub model: String,
    pub usage: Option<Usage>,
}

#[async_trait]
pub trait ChatCompletionProvider: Send + Sync {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, ChatProviderError>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
struct CompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Client for any `/chat/completions` endpoint that speaks the OpenAI wire format.
#[derive(Debug, Clone)]
pub struct OpenAiCompatibleClient {
    http: Client,
    endpoint: String,
    api_key: Arc<SecretString>,
    model: String,
}

impl OpenAiCompatibleClient {
    pub fn new(
        api_key: SecretString,
        base_url: &str,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ChatProviderError> {
        let http = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("second-brain/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ChatProviderError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: Arc::new(api_key),
            model: model.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatCompletionProvider for OpenAiCompatibleClient {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, ChatProviderError> {
        let body = CompletionBody {
            model: &self.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        let res = self
            .http
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let parsed = match res.status() {
            s if s.is_success() => res
                .json::<CompletionResponse>()
                .await
                .map_err(|e| ChatProviderError::Serde(e.to_string()))?,
            StatusCode::UNAUTHORIZED => return Err(ChatProviderError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => return Err(ChatProviderError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                return Err(ChatProviderError::Http { status, body });
            }
        };

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or(ChatProviderError::NoChoices)?;

        let content = choice
            .message
            .content
            .filter(|text| !text.trim().is_empty())
            .ok_or(ChatProviderError::EmptyContent)?;

        debug!(model = ?parsed.model, usage = ?parsed.usage, "Chat completion received");
        Ok(ChatCompletion {
            content,
            model: parsed.model.unwrap_or_else(|| self.model.clone()),
            usage: parsed.usage,
        })
    }

    fn name(&self) -> &'static str {
        "openai-compatible"
    }
}

fn map_reqwest_error(e: reqwest::Error) -> ChatProviderError {
    if e.is_timeout() {
        ChatProviderError::Timeout
    } else {
        ChatProviderError::Transport(e.to_string())
    }
}

/// Offline provider used when no API key is configured.
#[derive(Debug, Clone, Default)]
pub struct FallbackProvider;

impl FallbackProvider {
    fn answer(message: &str) -> &'static str {
        let lower = message.to_lowercase();
        let greeting = lower.contains("hello")
            || lower
                .split(|c: char| !c.is_alphanumeric())
                .any(|word| word == "hi");
        let has = |words: &[&str]| words.iter().any(|w| lower.contains(w));

        if greeting {
            "Hello! I'm your AI Assistant. I'm currently running in fallback mode, but I'm here to help you with your Second Brain system. How can I assist you today?"
        } else if has(&["idea", "analyze"]) {
            "I'd be happy to help you analyze your idea! I'm currently running in fallback mode, so for a full analysis configure the AI service. In the meantime, consider: What's the potential impact of this idea? What resources would you need? What are the first steps you could take?"
        } else if has(&["goal", "smart"]) {
            "Setting SMART goals is important for personal development. While I'm in fallback mode, remember that good goals are Specific, Measurable, Achievable, Relevant and Time-bound. What area of your life would you like to set goals for?"
        } else if has(&["task", "prioritize"]) {
            "I can help you prioritize your tasks! While I'm in fallback mode, consider: Which tasks have the biggest impact? What are your deadlines? Which tasks align with your goals? How does your energy change during the day?"
        } else if has(&["learn", "knowledge"]) {
            "Learning and knowledge management are key to personal growth! While I'm in fallback mode, think about: Which topics interest you most? How do you learn best? What resources do you have? How can you apply what you learn?"
        } else if has(&["habit", "routine"]) {
            "Building good habits is essential for personal development! While I'm in fallback mode, consider: What small change could make a big difference? When can you perform it consistently? What trigger will remind you? How will you track progress?"
        } else {
            "I'm your AI Assistant for the Second Brain system. I'm currently running in fallback mode, but I can help with:\n\n- Idea analysis and development\n- Knowledge synthesis and learning\n- SMART goal setting\n- Task prioritization and productivity\n- Learning content recommendations\n- Habit formation and personal development\n\nPlease try again later or check your AI service configuration."
        }
    }
}

#[async_trait]
impl ChatCompletionProvider for FallbackProvider {
    async fn complete(&self, request: ChatRequest) -> Result<ChatCompletion, ChatProviderError> {
        let last = request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default();

        Ok(ChatCompletion {
            content: Self::answer(last).to_string(),
            model: FALLBACK_MODEL.to_string(),
            usage: Some(Usage::default()),
        })
    }

    fn name(&self) -> &'static str {
        "fallback"
    }
}

/// HTTP client when a key is configured, the offline fallback otherwise.
pub fn provider_from_config(
    config: &AiConfig,
) -> Result<Arc<dyn ChatCompletionProvider>, ChatProviderError> {
    match &config.api_key {
        Some(key) => {
            let client = OpenAiCompatibleClient::new(
                SecretString::from(key.expose_secret().to_owned()),
                config.base_url.as_str(),
                config.model.clone(),
                config.timeout,
            )?;
            debug!(endpoint = client.endpoint(), model = %config.model, "Using chat completion API");
            Ok(Arc::new(client))
        }
        None => {
            warn!("AI_API_KEY not set, assistant runs in fallback mode");
            Ok(Arc::new(FallbackProvider))
        }
    }
}
