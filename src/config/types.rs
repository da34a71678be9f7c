//! Configuration Types
//!
//! All configuration structures with sensible defaults.
//! Supports global (~/.config/clubguide/) and project (./clubguide.toml) level configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::ai::prompt::DEFAULT_SYSTEM_INSTRUCTION;
use crate::constants::{analyzer, provider, server, telemetry, throttle};
use crate::types::{GuideError, Result};

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP listener settings
    pub server: ServerConfig,

    /// Ordered provider slots
    pub providers: ProvidersConfig,

    /// System instruction and ranking marker
    pub prompt: PromptConfig,

    /// Collector endpoint settings
    pub telemetry: TelemetryConfig,

    /// Request gate settings
    pub throttle: ThrottleConfig,
}

impl Config {
    /// Validate configuration values are within acceptable ranges.
    /// Returns `GuideError::Config` on validation failure.
    pub fn validate(&self) -> Result<()> {
        for slot in self.providers.ordered() {
            if slot.timeout_secs == 0 {
                return Err(GuideError::Config(format!(
                    "Provider '{}' timeout_secs must be greater than 0",
                    slot.name
                )));
            }
            if let Some(temperature) = slot.temperature
                && !(0.0..=2.0).contains(&temperature)
            {
                return Err(GuideError::Config(format!(
                    "Provider '{}' temperature must be between 0.0 and 2.0, got {}",
                    slot.name, temperature
                )));
            }
            url::Url::parse(&slot.api_base).map_err(|e| {
                GuideError::Config(format!(
                    "Provider '{}' api_base is not a valid URL: {}",
                    slot.name, e
                ))
            })?;
        }

        if self.providers.primary.name == self.providers.secondary.name {
            return Err(GuideError::Config(format!(
                "Provider names must be distinct, both are '{}'",
                self.providers.primary.name
            )));
        }

        if self.telemetry.enabled {
            url::Url::parse(&self.telemetry.endpoint).map_err(|e| {
                GuideError::Config(format!("Telemetry endpoint is not a valid URL: {}", e))
            })?;
        }
        if self.telemetry.timeout_secs == 0 {
            return Err(GuideError::Config(
                "Telemetry timeout_secs must be greater than 0".to_string(),
            ));
        }

        if !(self.throttle.window_secs.is_finite() && self.throttle.window_secs > 0.0) {
            return Err(GuideError::Config(format!(
                "Throttle window_secs must be a positive number, got {}",
                self.throttle.window_secs
            )));
        }

        if self.prompt.marker.is_empty() {
            return Err(GuideError::Config(
                "Prompt marker must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}

// =============================================================================
// Server Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: server::DEFAULT_HOST.to_string(),
            port: server::DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// =============================================================================
// Provider Configuration
// =============================================================================

/// The two provider slots, tried primary first
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub primary: ProviderConfig,
    pub secondary: ProviderConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            primary: ProviderConfig::primary(),
            secondary: ProviderConfig::secondary(),
        }
    }
}

impl ProvidersConfig {
    /// Slots in priority order
    pub fn ordered(&self) -> [&ProviderConfig; 2] {
        [&self.primary, &self.secondary]
    }
}

/// Configuration for one OpenAI-compatible provider
///
/// Note: API keys are never serialized to output and are redacted in debug
/// output. The provider converts the key to SecretString internally.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Identifier reported as the answer source
    pub name: String,
    /// API base URL (the `/chat/completions` path is appended)
    pub api_base: String,
    /// Model name (provider-specific)
    pub model: String,
    /// API key; never serialized to output
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
    /// Environment variable consulted when `api_key` is absent
    #[serde(default)]
    pub api_key_env: Option<String>,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Sampling temperature; the provider default applies when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    /// Completion length cap; uncapped when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,
    /// Disabled slots are never tried
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("name", &self.name)
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_key_env", &self.api_key_env)
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("enabled", &self.enabled)
            .finish()
    }
}

fn default_enabled() -> bool {
    true
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self::primary()
    }
}

impl ProviderConfig {
    /// OpenAI defaults
    pub fn primary() -> Self {
        Self {
            name: provider::PRIMARY_NAME.to_string(),
            api_base: provider::PRIMARY_API_BASE.to_string(),
            model: provider::PRIMARY_MODEL.to_string(),
            api_key: None,
            api_key_env: Some(provider::PRIMARY_API_KEY_ENV.to_string()),
            timeout_secs: provider::PRIMARY_TIMEOUT_SECS,
            temperature: None,
            max_tokens: None,
            enabled: true,
        }
    }

    /// OpenRouter defaults
    pub fn secondary() -> Self {
        Self {
            name: provider::SECONDARY_NAME.to_string(),
            api_base: provider::SECONDARY_API_BASE.to_string(),
            model: provider::SECONDARY_MODEL.to_string(),
            api_key: None,
            api_key_env: Some(provider::SECONDARY_API_KEY_ENV.to_string()),
            timeout_secs: provider::SECONDARY_TIMEOUT_SECS,
            temperature: None,
            max_tokens: None,
            enabled: true,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Explicit key first, then the configured environment variable.
    /// Blank values count as missing.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| {
                self.api_key_env
                    .as_deref()
                    .and_then(|var| std::env::var(var).ok())
            })
            .filter(|key| !key.trim().is_empty())
    }
}

// =============================================================================
// Prompt Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// System instruction sent with every question
    pub system_instruction: String,
    /// Substring naming the promoted club in answers
    pub marker: String,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            system_instruction: DEFAULT_SYSTEM_INSTRUCTION.to_string(),
            marker: analyzer::DEFAULT_MARKER.to_string(),
        }
    }
}

// =============================================================================
// Telemetry Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    /// Collector URL receiving a form-encoded POST
    pub endpoint: String,
    pub question_field: String,
    pub answer_field: String,
    pub rank_field: String,
    pub timeout_secs: u64,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: telemetry::DEFAULT_ENDPOINT.to_string(),
            question_field: telemetry::QUESTION_FIELD.to_string(),
            answer_field: telemetry::ANSWER_FIELD.to_string(),
            rank_field: telemetry::RANK_FIELD.to_string(),
            timeout_secs: telemetry::TIMEOUT_SECS,
        }
    }
}

impl TelemetryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

// =============================================================================
// Throttle Configuration
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThrottleConfig {
    /// Minimum seconds between accepted questions from one session
    pub window_secs: f64,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            window_secs: throttle::WINDOW_SECS,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
