//! Async LLM client
//!
//! A model-agnostic HTTP client for the AI collaborator. Each vendor is an
//! `AiProvider` variant that knows its own request shape, auth header and
//! response path; the rest of the crate only sees `send(prompt, params)`.

use crate::core::error::{EngineError, Result};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const DEFAULT_API_URL: &str = "https://api.anthropic.com/v1/messages";
const DEFAULT_MODEL: &str = "claude-3-haiku-20240307";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// A system + user message pair
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

impl Prompt {
    pub fn new(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
        }
    }
}

/// Sampling parameters shared by every provider
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SendParams {
    pub max_tokens: u32,
    pub temperature: f32,
}

impl Default for SendParams {
    fn default() -> Self {
        Self {
            max_tokens: 1024,
            temperature: 0.7,
        }
    }
}

/// Supported vendors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Anthropic,
    /// OpenAI and compatible APIs (DeepSeek, OpenRouter, local servers)
    OpenAi,
    Gemini,
}

fn decode<T: serde::de::DeserializeOwned>(body: Value) -> Result<T> {
    serde_json::from_value(body)
        .map_err(|e| EngineError::Provider(format!("unexpected response shape: {}", e)))
}

impl AiProvider {
    /// Detect the vendor from the API URL
    pub fn detect(url: &str) -> Self {
        if url.contains("anthropic.com") {
            AiProvider::Anthropic
        } else if url.contains("generativelanguage.googleapis.com") {
            AiProvider::Gemini
        } else {
            AiProvider::OpenAi
        }
    }

    /// Request body in this vendor's format
    pub fn request_body(&self, model: &str, prompt: &Prompt, params: &SendParams) -> Value {
        let body = match self {
            AiProvider::Anthropic => serde_json::to_value(AnthropicRequest {
                model: model.to_string(),
                max_tokens: params.max_tokens,
                temperature: params.temperature,
                system: prompt.system.clone(),
                messages: vec![Message::user(&prompt.user)],
            }),
            AiProvider::OpenAi => serde_json::to_value(OpenAiRequest {
                model: model.to_string(),
                max_tokens: params.max_tokens,
                temperature: params.temperature,
                messages: vec![
                    Message {
                        role: "system".into(),
                        content: prompt.system.clone(),
                    },
                    Message::user(&prompt.user),
                ],
            }),
            AiProvider::Gemini => serde_json::to_value(GeminiRequest {
                system_instruction: GeminiContent {
                    role: None,
                    parts: vec![GeminiPart { text: prompt.system.clone() }],
                },
                contents: vec![GeminiContent {
                    role: Some("user".into()),
                    parts: vec![GeminiPart { text: prompt.user.clone() }],
                }],
                generation_config: GeminiGenerationConfig {
                    max_output_tokens: params.max_tokens,
                    temperature: params.temperature,
                },
            }),
        };
        // Plain structs of strings and numbers always serialize
        body.unwrap_or(Value::Null)
    }

    /// Pull the completion text out of a response body
    ///
    /// A body that does not match the provider's shape is a provider error.
    pub fn extract_text(&self, body: Value) -> Result<String> {
        let text = match self {
            AiProvider::Anthropic => decode::<AnthropicResponse>(body)?
                .content
                .into_iter()
                .find_map(|c| c.text),
            AiProvider::OpenAi => decode::<OpenAiResponse>(body)?
                .choices
                .into_iter()
                .next()
                .and_then(|c| c.message.content),
            AiProvider::Gemini => decode::<GeminiResponse>(body)?
                .candidates
                .into_iter()
                .next()
                .and_then(|c| c.content.parts.into_iter().next())
                .map(|p| p.text),
        };
        text.filter(|t| !t.trim().is_empty())
            .ok_or_else(|| EngineError::Provider("Empty response".into()))
    }

    fn endpoint(&self, api_url: &str, model: &str) -> String {
        match self {
            AiProvider::Gemini if !api_url.contains(":generateContent") => format!(
                "{}/models/{}:generateContent",
                api_url.trim_end_matches('/'),
                model
            ),
            _ => api_url.to_string(),
        }
    }

    /// Send one completion request and return the text
    pub async fn send(
        &self,
        http: &Client,
        credentials: &Credentials,
        prompt: &Prompt,
        params: &SendParams,
    ) -> Result<String> {
        let url = self.endpoint(&credentials.api_url, &credentials.model);
        let request = http
            .post(url)
            .header("content-type", "application/json")
            .json(&self.request_body(&credentials.model, prompt, params));

        let request = match self {
            AiProvider::Anthropic => request
                .header("x-api-key", &credentials.api_key)
                .header("anthropic-version", "2023-06-01"),
            AiProvider::OpenAi => {
                request.header("Authorization", format!("Bearer {}", credentials.api_key))
            }
            AiProvider::Gemini => request.header("x-goog-api-key", &credentials.api_key),
        };

        let response = request
            .send()
            .await
            .map_err(|e| EngineError::Provider(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(EngineError::Provider(format!("API error {}: {}", status, error_text)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| EngineError::Provider(e.to_string()))?;

        self.extract_text(body)
    }
}

/// Where and as whom to send requests
#[derive(Debug, Clone, PartialEq)]
pub struct Credentials {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
}

/// Async LLM client for making API calls
pub struct LlmClient {
    http: Client,
    provider: AiProvider,
    credentials: Credentials,
}

impl LlmClient {
    /// Create a new LLM client with explicit configuration
    pub fn new(api_key: String, api_url: String, model: String) -> Self {
        let provider = AiProvider::detect(&api_url);
        Self {
            http: build_http(DEFAULT_TIMEOUT).unwrap_or_default(),
            provider,
            credentials: Credentials {
                api_key,
                api_url,
                model,
            },
        }
    }

    /// Create a client from environment variables
    ///
    /// Required: LLM_API_KEY
    /// Optional: LLM_API_URL (defaults to Anthropic API)
    /// Optional: LLM_MODEL (defaults to claude-3-haiku-20240307)
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| EngineError::Provider("LLM_API_KEY not set".into()))?;
        let api_url = std::env::var("LLM_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.into());
        let model = std::env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());

        Ok(Self::new(api_key, api_url, model))
    }

    /// Replace the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = build_http(timeout)?;
        Ok(self)
    }

    pub fn provider(&self) -> AiProvider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.credentials.model
    }

    /// Send a completion request to the configured provider
    pub async fn send(&self, prompt: &Prompt, params: &SendParams) -> Result<String> {
        tracing::debug!(provider = ?self.provider, model = %self.credentials.model, "Sending LLM request");
        self.provider
            .send(&self.http, &self.credentials, prompt, params)
            .await
    }
}

fn build_http(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| EngineError::Provider(e.to_string()))
}

// Anthropic API format
#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

// OpenAI-compatible API format (OpenAI, DeepSeek, OpenRouter, etc.)
#[derive(Serialize)]
struct OpenAiRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    messages: Vec<Message>,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

// Gemini API format
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: GeminiContent,
    contents: Vec<GeminiContent>,
    generation_config: GeminiGenerationConfig,
}

#[derive(Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiGenerationConfig {
    max_output_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

// Shared
#[derive(Serialize)]
struct Message {
    role: String,
    content: String,
}

impl Message {
    fn user(content: &str) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}
