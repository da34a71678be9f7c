//! OpenAI-Compatible Chat Completions Provider
//!
//! One client for every endpoint that speaks the Chat Completions wire format:
//! OpenAI itself for the primary slot, OpenRouter for the secondary slot.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

use super::TextProvider;
use crate::ai::prompt::{ChatMessage, conversation};
use crate::config::ProviderConfig;
use crate::constants::provider::ERROR_BODY_PREVIEW_CHARS;
use crate::types::{ErrorCategory, ErrorClassifier, GuideError, LlmError, Result, truncate_chars};

/// Chat Completions provider with secure API key handling
pub struct OpenAiCompatProvider {
    name: String,
    /// API key stored securely - never exposed in logs or debug output
    api_key: SecretString,
    api_base: String,
    model: String,
    temperature: Option<f32>,
    max_tokens: Option<usize>,
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenAiCompatProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiCompatProvider")
            .field("name", &self.name)
            .field("api_key", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl OpenAiCompatProvider {
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let api_key = config.resolve_api_key().ok_or_else(|| {
            GuideError::Config(format!(
                "API key for '{}' not found. Set {} or provide api_key in config",
                config.name,
                config.api_key_env.as_deref().unwrap_or("an api_key_env variable")
            ))
        })?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                GuideError::Config(format!("Failed to create HTTP client: {}", e))
            })?;

        Ok(Self {
            name: config.name.clone(),
            api_key: SecretString::from(api_key),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            client,
        })
    }

    fn build_request(&self, question: &str, system_instruction: &str) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.model.clone(),
            messages: conversation(system_instruction, question),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }

    fn failure(&self, category: ErrorCategory, message: impl Into<String>) -> GuideError {
        GuideError::Llm(LlmError::with_provider(category, message, &self.name))
    }
}

#[async_trait]
impl TextProvider for OpenAiCompatProvider {
    async fn generate(&self, question: &str, system_instruction: &str) -> Result<String> {
        info!(provider = %self.name, model = %self.model, "Generating answer");

        let start_time = Instant::now();
        let request = self.build_request(question, system_instruction);
        let url = format!("{}/chat/completions", self.api_base);

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GuideError::Llm(ErrorClassifier::classify_http_status(
                status.as_u16(),
                &format!(
                    "API error ({}): {}",
                    status,
                    truncate_chars(&body, ERROR_BODY_PREVIEW_CHARS)
                ),
                &self.name,
            )));
        }

        let response_body: ChatCompletionResponse = response.json().await.map_err(|e| {
            self.failure(
                ErrorCategory::ParseError,
                format!("Failed to parse response: {}", e),
            )
        })?;

        let content = response_body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| self.failure(ErrorCategory::ParseError, "No content in response"))?;

        debug!(
            provider = %self.name,
            elapsed_ms = start_time.elapsed().as_millis() as u64,
            chars = content.chars().count(),
            "Received answer"
        );

        Ok(content)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn health_check(&self) -> Result<bool> {
        let url = format!("{}/models", self.api_base);

        let response = self
            .client
            .get(&url)
            .bearer_auth(self.api_key.expose_secret())
            .send()
            .await;

        match response {
            Ok(resp) if resp.status().is_success() => {
                info!(provider = %self.name, "API is available");
                Ok(true)
            }
            Ok(resp) => {
                warn!(provider = %self.name, status = %resp.status(), "API check failed");
                Ok(false)
            }
            Err(e) => {
                warn!(provider = %self.name, error = %e, "API check failed");
                Ok(false)
            }
        }
    }
}

// Request/Response types

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}
