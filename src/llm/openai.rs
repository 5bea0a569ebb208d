use std::time::Duration;

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::traits::{ChatClient, ChatError, ChatMessage};
use crate::config::LLMOpenAIConfig;

const DEFAULT_TIMEOUT_SECS: u64 = 300;

// Chat Request

#[derive(Serialize)]
struct OpenAIChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reasoning_effort: Option<&'a str>,
    stream: bool,
}

// Chat Response

#[derive(Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIResponseMessage,
}

#[derive(Deserialize)]
struct OpenAIResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Non-streaming client for OpenAI-compatible `/chat/completions`
/// endpoints. The whole call is one blocking unit of work from the
/// caller's point of view; the configured timeout is the hard ceiling an
/// abandoned request runs up against.
pub struct OpenAIClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    reasoning_effort: Option<String>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    timeout_secs: u64,
}

impl OpenAIClient {
    pub fn new(config: &LLMOpenAIConfig) -> Result<Self> {
        let api_key = config
            .get_api_key()
            .ok_or_else(|| anyhow!("API key is not configured"))?;
        let base_url = config
            .get_base_url()
            .unwrap_or_else(|| "https://api.openai.com/v1".to_string());
        let model = config
            .model
            .clone()
            .unwrap_or_else(|| "gpt-5-nano".to_string());
        let timeout_secs = config.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS);

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .context("building HTTP client")?;

        Ok(Self {
            client,
            api_key,
            base_url,
            model,
            reasoning_effort: config.reasoning_effort.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs,
        })
    }
}

#[async_trait]
impl ChatClient for OpenAIClient {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn chat(&self, messages: &[ChatMessage]) -> Result<String, ChatError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let payload = OpenAIChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            reasoning_effort: self.reasoning_effort.as_deref(),
            stream: false,
        };

        debug!(model = %self.model, count = messages.len(), "sending chat completion request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    ChatError::Timeout(self.timeout_secs)
                } else {
                    ChatError::Transport(err)
                }
            })?;

        let status = response.status();
        let body = response.text().await.map_err(ChatError::Transport)?;
        if !status.is_success() {
            return Err(ChatError::Api { status, body });
        }

        let parsed: OpenAIChatResponse = serde_json::from_str(&body)?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        debug!(chars = content.len(), "chat completion finished");
        Ok(content)
    }
}
