//! Text Provider Abstraction
//!
//! Defines the TextProvider trait: one free-text answer per question, given
//! the fixed system instruction. Network and credential details stay inside
//! each implementation.
//!
//! ## Modules
//!
//! - `chain`: Ordered provider chain with a static fallback answer
//! - `openai`: OpenAI-compatible Chat Completions client (OpenAI, OpenRouter)

mod chain;
mod openai;

pub use chain::{ProviderChain, ProviderChainBuilder, ProviderDescriptor};
pub use openai::OpenAiCompatProvider;

// Re-export error types from centralized location
pub use crate::types::{ErrorCategory, ErrorClassifier, LlmError};

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::ProvidersConfig;
use crate::types::Result;

/// Shared provider handle, read-only across concurrent requests.
pub type SharedProvider = Arc<dyn TextProvider + Send + Sync>;

// =============================================================================
// Text Provider Trait
// =============================================================================

#[async_trait]
pub trait TextProvider: Send + Sync {
    /// Generate an answer to `question` under `system_instruction`
    async fn generate(&self, question: &str, system_instruction: &str) -> Result<String>;

    /// Provider id, reported as the answer source
    fn name(&self) -> &str;

    /// Model name currently in use
    fn model(&self) -> &str;

    /// Check if the provider is reachable with its credentials
    async fn health_check(&self) -> Result<bool>;
}

/// Build descriptors for every enabled slot that has a credential.
///
/// Slots without a resolvable API key are skipped with a warning; an empty
/// result is reported later as a configuration failure.
pub fn create_descriptors(config: &ProvidersConfig) -> Vec<ProviderDescriptor> {
    let mut descriptors = Vec::new();

    for (rank, slot) in config.ordered().into_iter().enumerate() {
        if !slot.enabled {
            info!(provider = %slot.name, "Provider disabled in configuration");
            continue;
        }

        match OpenAiCompatProvider::new(slot) {
            Ok(provider) => {
                info!(provider = %slot.name, model = %slot.model, rank, "Provider configured");
                descriptors.push(ProviderDescriptor::new(
                    rank as u8,
                    Arc::new(provider),
                    slot.timeout(),
                ));
            }
            Err(e) => {
                warn!(provider = %slot.name, error = %e, "Provider not initialized, skipping");
            }
        }
    }

    descriptors
}
