//! Chat completion client: trait seam plus the OpenAI-compatible default.
//!
//! The [`ChatClient`] trait exists so tests (and embedders) can substitute a
//! canned implementation without any network I/O; production code uses
//! [`OpenAiChatClient`], a thin reqwest wrapper around the
//! `/v1/chat/completions` endpoint. Per the single-attempt policy, a failed
//! call is reported, not retried.

use crate::config::GenerationConfig;
use crate::error::CourseGenError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// A chat completion request: one system message, one user message.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// A chat completion reply.
#[derive(Debug, Clone)]
pub struct ChatResponse {
    pub content: String,
    pub prompt_tokens: u64,
    pub completion_tokens: u64,
}

/// Trait for chat completion clients, enabling mocking in tests.
#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, CourseGenError>;
}

/// OpenAI-compatible chat client.
///
/// NOTE: Do NOT derive `Debug` on this struct — `api_key` would be exposed.
pub struct OpenAiChatClient {
    http: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: Vec<WireMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct WireMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReplyMessage,
}

#[derive(Deserialize)]
struct WireReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize, Default)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: u64,
    #[serde(default)]
    completion_tokens: u64,
}

impl OpenAiChatClient {
    /// Build a client from the configuration.
    ///
    /// Fails with [`CourseGenError::ChatNotConfigured`] when no API key is
    /// present — callers get the hint before any prompt is built.
    pub fn new(config: &GenerationConfig) -> Result<Self, CourseGenError> {
        let api_key = config
            .chat_api_key
            .clone()
            .ok_or_else(|| CourseGenError::ChatNotConfigured {
                hint: "Set OPENAI_API_KEY, or inject a chat client via GenerationConfig::builder().chat_client(..).".to_string(),
            })?;

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.api_timeout_secs))
            .build()
            .map_err(|e| CourseGenError::Internal(format!("http client: {e}")))?;

        Ok(Self {
            http,
            api_key,
            base_url: config.chat_base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ChatClient for OpenAiChatClient {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, CourseGenError> {
        let url = format!("{}/v1/chat/completions", self.base_url);

        let body = WireRequest {
            model: &request.model,
            messages: vec![
                WireMessage {
                    role: "system",
                    content: &request.system,
                },
                WireMessage {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
        };

        debug!(model = %request.model, url = %url, "sending chat completion request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| CourseGenError::ChatApi {
                detail: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(CourseGenError::ChatApi {
                detail: format!("HTTP {status}: {text}"),
            });
        }

        let reply: WireResponse = response.json().await.map_err(|e| CourseGenError::ChatApi {
            detail: format!("invalid response body: {e}"),
        })?;

        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| CourseGenError::ChatApi {
                detail: "response contained no choices".to_string(),
            })?;

        let usage = reply.usage.unwrap_or_default();
        debug!(
            prompt_tokens = usage.prompt_tokens,
            completion_tokens = usage.completion_tokens,
            "chat completion received"
        );

        Ok(ChatResponse {
            content,
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
        })
    }
}
