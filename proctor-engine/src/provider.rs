//! Completion-service abstraction and the OpenAI implementation.
//!
//! A provider turns a system directive plus role-tagged conversation history
//! into a single assistant-authored text completion.

use async_trait::async_trait;
use proctor_common::config::CompletionConfig;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;

/// Interviewer responses stay short; questions are a sentence or two and the
/// final assessment fits comfortably in this budget.
const MAX_TOKENS: i64 = 500;
const TEMPERATURE: f64 = 0.7;

/// One role-tagged turn of conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    /// "assistant" or "user".
    pub role: String,
    pub content: String,
}

/// Error from a completion provider.
#[derive(Debug, Clone)]
pub struct CompletionError {
    pub provider: String,
    pub model: String,
    pub message: String,
    pub status_code: Option<u16>,
}

impl std::fmt::Display for CompletionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}:{}] {}", self.provider, self.model, self.message)
    }
}

impl std::error::Error for CompletionError {}

/// Unified interface for text-completion services.
#[async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Get the provider name.
    fn name(&self) -> &str;

    /// Produce one assistant completion for the directive and history.
    async fn complete(
        &self,
        directive: &str,
        history: &[Turn],
    ) -> Result<String, CompletionError>;
}

/// OpenAI chat-completions provider.
pub struct OpenAiProvider {
    client: reqwest::Client,
    base_url: String,
    model: String,
}

impl OpenAiProvider {
    /// Create a new provider against the public OpenAI endpoint.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, "https://api.openai.com", model)
    }

    /// Create with a custom base URL (compatible APIs, tests).
    pub fn with_base_url(
        api_key: impl Into<String>,
        base_url: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        let api_key = api_key.into();
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .unwrap_or_else(|_| HeaderValue::from_static("")),
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            base_url: base_url.into(),
            model: model.into(),
        }
    }

    fn err(&self, message: String, status_code: Option<u16>) -> CompletionError {
        CompletionError {
            provider: "openai".into(),
            model: self.model.clone(),
            message,
            status_code,
        }
    }
}

#[async_trait]
impl CompletionProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(
        &self,
        directive: &str,
        history: &[Turn],
    ) -> Result<String, CompletionError> {
        let start = Instant::now();
        let url = format!("{}/v1/chat/completions", self.base_url);

        let mut messages = Vec::with_capacity(history.len() + 1);
        messages.push(OpenAiMessage {
            role: "system".into(),
            content: directive.to_string(),
        });
        messages.extend(history.iter().map(|t| OpenAiMessage {
            role: t.role.clone(),
            content: t.content.clone(),
        }));

        let request = OpenAiRequest {
            model: self.model.clone(),
            messages,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| self.err(format!("Request failed: {}", e), None))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(self.err(format!("API error: {}", body), Some(status.as_u16())));
        }

        let parsed: OpenAiResponse = response
            .json()
            .await
            .map_err(|e| self.err(format!("Failed to parse response: {}", e), None))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| self.err("Response contained no choices".into(), None))?;

        tracing::debug!(
            provider = "openai",
            model = %self.model,
            latency_ms = start.elapsed().as_millis() as u64,
            "Completion received"
        );

        Ok(content)
    }
}

/// Build the provider from configuration. Returns `None` when no API key is
/// configured, which selects the orchestrator's deterministic fallback path.
pub fn provider_from_config(config: &CompletionConfig) -> Option<Arc<dyn CompletionProvider>> {
    match &config.api_key {
        Some(key) if !key.is_empty() => Some(Arc::new(OpenAiProvider::with_base_url(
            key,
            config.base_url.clone(),
            config.model.clone(),
        ))),
        _ => {
            tracing::warn!("No completion API key configured; using deterministic fallbacks");
            None
        }
    }
}

// ============================================================================
// OpenAI API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct OpenAiRequest {
    model: String,
    messages: Vec<OpenAiMessage>,
    max_tokens: i64,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct OpenAiMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct OpenAiResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}
