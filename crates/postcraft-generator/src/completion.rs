//! Chat-completion client for an OpenAI-compatible `/chat/completions` API.

use async_trait::async_trait;
use postcraft_core::AppConfig;
use serde::{Deserialize, Serialize};

use crate::error::CompletionError;

pub const DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";
const SYSTEM_MESSAGE: &str = "You are a helpful assistant that strictly outputs JSON.";

/// Produces raw candidate texts for a prompt.
#[async_trait]
pub trait CompletionService: Send + Sync {
    /// Returns up to `n` completions for `prompt`.
    async fn complete(&self, prompt: &str, n: usize) -> Result<Vec<String>, CompletionError>;
}

/// Sampling parameters sent with every request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 1500,
        }
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

pub struct ChatCompletionClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    settings: ChatSettings,
}

impl ChatCompletionClient {
    /// Builds a client from the completion section of `config`.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::MissingApiKey`] when no key is configured,
    /// or an HTTP/URL error if the client cannot be built.
    pub fn new(config: &AppConfig) -> Result<Self, CompletionError> {
        let api_key = config
            .completion_api_key
            .as_deref()
            .ok_or(CompletionError::MissingApiKey)?;
        Self::with_base_url(
            &config.completion_base_url,
            api_key,
            ChatSettings {
                model: config.completion_model.clone(),
                temperature: config.completion_temperature,
                max_tokens: config.completion_max_tokens,
            },
        )
    }

    /// Builds a client against an explicit base URL, e.g. a mock server.
    ///
    /// # Errors
    ///
    /// Returns [`CompletionError::InvalidBaseUrl`] if `base_url` is not an
    /// absolute URL, or [`CompletionError::Http`] if the client cannot be built.
    pub fn with_base_url(
        base_url: &str,
        api_key: &str,
        settings: ChatSettings,
    ) -> Result<Self, CompletionError> {
        let trimmed = base_url.trim_end_matches('/');
        reqwest::Url::parse(trimmed).map_err(|e| CompletionError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;
        Ok(Self {
            client,
            endpoint: format!("{trimmed}/chat/completions"),
            api_key: api_key.to_string(),
            settings,
        })
    }

    async fn complete_once(&self, prompt: &str) -> Result<String, CompletionError> {
        let request = ChatRequest {
            model: &self.settings.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: prompt,
                },
            ],
            temperature: self.settings.temperature,
            max_tokens: self.settings.max_tokens,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CompletionError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or(CompletionError::EmptyResponse)
    }
}

#[async_trait]
impl CompletionService for ChatCompletionClient {
    /// Issues `n` sequential single-choice requests.
    async fn complete(&self, prompt: &str, n: usize) -> Result<Vec<String>, CompletionError> {
        let mut out = Vec::with_capacity(n);
        for i in 0..n {
            tracing::info!(
                candidate = i + 1,
                n,
                model = %self.settings.model,
                "requesting completion"
            );
            out.push(self.complete_once(prompt).await?);
        }
        Ok(out)
    }
}
