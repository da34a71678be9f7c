//! Ordered Provider Chain with Static Fallback
//!
//! Tries providers strictly in priority order and surfaces exactly one answer.
//!
//! ## Strategy
//!
//! 1. Ask the next provider, bounded by that provider's own timeout
//! 2. On success, stop and return its text
//! 3. On any failure (timeout, transport, status, payload), record it and move on
//! 4. When every provider has failed, return the static apology text
//!
//! No provider is asked twice for the same question, and provider errors are
//! never propagated to the caller.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, instrument, warn};

use super::{SharedProvider, TextProvider};
use crate::ai::timeout::with_timeout;
use crate::constants::chain::FALLBACK_MESSAGE;
use crate::types::{
    AiAnswer, AttemptOutcome, ErrorClassifier, ProviderAttempt, Question, Resolution,
};

/// Provider with its priority slot and call bound. Immutable after startup.
#[derive(Clone)]
pub struct ProviderDescriptor {
    /// Priority (lower = try first)
    pub rank: u8,
    /// Provider instance
    pub provider: SharedProvider,
    /// Wall-clock bound for a single call
    pub timeout: Duration,
}

impl ProviderDescriptor {
    pub fn new(rank: u8, provider: SharedProvider, timeout: Duration) -> Self {
        Self {
            rank,
            provider,
            timeout,
        }
    }

    pub fn id(&self) -> &str {
        self.provider.name()
    }
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("rank", &self.rank)
            .field("id", &self.id())
            .field("model", &self.provider.model())
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Provider chain resolving a question to exactly one answer
#[derive(Debug, Clone)]
pub struct ProviderChain {
    /// Sorted by ascending rank
    providers: Vec<ProviderDescriptor>,
    system_instruction: Arc<str>,
    fallback_text: Arc<str>,
}

impl ProviderChain {
    /// Create a chain; descriptors are sorted by rank
    pub fn new(mut providers: Vec<ProviderDescriptor>, system_instruction: &str) -> Self {
        providers.sort_by_key(|p| p.rank);
        Self {
            providers,
            system_instruction: Arc::from(system_instruction),
            fallback_text: Arc::from(FALLBACK_MESSAGE),
        }
    }

    /// Replace the static apology text
    pub fn with_fallback_text(mut self, text: &str) -> Self {
        self.fallback_text = Arc::from(text);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    /// Provider ids in the order they are tried
    pub fn provider_ids(&self) -> Vec<String> {
        self.providers.iter().map(|p| p.id().to_string()).collect()
    }

    /// Resolve a question: first provider success, else the static fallback
    #[instrument(skip(self, question), fields(providers = self.providers.len()))]
    pub async fn resolve(&self, question: &Question) -> Resolution {
        let start_time = Instant::now();
        let mut attempts = Vec::with_capacity(self.providers.len());

        for descriptor in &self.providers {
            let provider_name = descriptor.id().to_string();
            let attempt_start = Instant::now();

            debug!(
                provider = %provider_name,
                rank = descriptor.rank,
                timeout_ms = descriptor.timeout.as_millis() as u64,
                "Chain attempt"
            );

            let result = with_timeout(
                descriptor.timeout,
                descriptor
                    .provider
                    .generate(question.as_str(), &self.system_instruction),
                &format!("{} request", provider_name),
            )
            .await;
            let duration_ms = attempt_start.elapsed().as_millis() as u64;

            match result {
                Ok(text) => {
                    attempts.push(ProviderAttempt {
                        provider_id: provider_name.clone(),
                        outcome: AttemptOutcome::Success(text.clone()),
                        duration_ms,
                    });

                    info!(
                        provider = %provider_name,
                        attempts = attempts.len(),
                        total_ms = start_time.elapsed().as_millis() as u64,
                        "Chain succeeded"
                    );

                    return Resolution {
                        answer: AiAnswer::from_provider(text, provider_name),
                        attempts,
                    };
                }
                Err(err) => {
                    let classified = ErrorClassifier::classify_guide_error(&err, &provider_name);

                    warn!(
                        provider = %provider_name,
                        duration_ms,
                        category = %classified.category,
                        error = %err,
                        "Provider failed, falling through"
                    );

                    attempts.push(ProviderAttempt {
                        provider_id: provider_name,
                        outcome: AttemptOutcome::Failure(classified),
                        duration_ms,
                    });
                }
            }
        }

        warn!(
            attempts = attempts.len(),
            total_ms = start_time.elapsed().as_millis() as u64,
            "All providers failed, returning fallback answer"
        );

        Resolution {
            answer: AiAnswer::fallback(self.fallback_text.as_ref()),
            attempts,
        }
    }

    /// Run health checks on every provider in order
    pub async fn health_report(&self) -> Vec<(String, bool)> {
        let mut report = Vec::with_capacity(self.providers.len());
        for descriptor in &self.providers {
            let healthy = with_timeout(
                descriptor.timeout,
                descriptor.provider.health_check(),
                "health check",
            )
            .await
            .unwrap_or(false);
            report.push((descriptor.id().to_string(), healthy));
        }
        report
    }
}

/// Builder for creating provider chains
pub struct ProviderChainBuilder {
    providers: Vec<ProviderDescriptor>,
    system_instruction: String,
    fallback_text: Option<String>,
}

impl ProviderChainBuilder {
    pub fn new(system_instruction: impl Into<String>) -> Self {
        Self {
            providers: Vec::new(),
            system_instruction: system_instruction.into(),
            fallback_text: None,
        }
    }

    /// Add a provider in the next priority slot
    pub fn add_provider(self, provider: impl TextProvider + 'static, timeout: Duration) -> Self {
        self.add_shared(Arc::new(provider), timeout)
    }

    /// Add a shared provider in the next priority slot
    pub fn add_shared(mut self, provider: SharedProvider, timeout: Duration) -> Self {
        let rank = self.providers.len() as u8;
        self.providers
            .push(ProviderDescriptor::new(rank, provider, timeout));
        self
    }

    /// Add prebuilt descriptors (keeps their ranks)
    pub fn add_descriptors(mut self, descriptors: impl IntoIterator<Item = ProviderDescriptor>) -> Self {
        self.providers.extend(descriptors);
        self
    }

    pub fn fallback_text(mut self, text: impl Into<String>) -> Self {
        self.fallback_text = Some(text.into());
        self
    }

    /// Build the chain
    pub fn build(self) -> ProviderChain {
        let chain = ProviderChain::new(self.providers, &self.system_instruction);
        match self.fallback_text {
            Some(text) => chain.with_fallback_text(&text),
            None => chain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ErrorCategory, GuideError, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    enum Behavior {
        Answer(&'static str),
        Fail,
        Hang,
    }

    struct MockProvider {
        name: String,
        behavior: Behavior,
        calls: AtomicU32,
    }

    impl MockProvider {
        fn new(name: &str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name: name.to_string(),
                behavior,
                calls: AtomicU32::new(0),
            })
        }
    }

    #[async_trait]
    impl TextProvider for MockProvider {
        async fn generate(&self, _question: &str, system_instruction: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            assert_eq!(system_instruction, "instruction");
            match self.behavior {
                Behavior::Answer(text) => Ok(text.to_string()),
                Behavior::Fail => Err(GuideError::llm_with_category(
                    ErrorCategory::Transient,
                    format!("{} transient error", self.name),
                )),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(60)).await;
                    Ok("too late".to_string())
                }
            }
        }

        fn name(&self) -> &str {
            &self.name
        }

        fn model(&self) -> &str {
            "mock-model"
        }

        async fn health_check(&self) -> Result<bool> {
            Ok(!matches!(self.behavior, Behavior::Fail))
        }
    }

    fn question() -> Question {
        Question::parse(Some("I like robotics")).unwrap()
    }

    const SHORT: Duration = Duration::from_secs(1);

    #[tokio::test]
    async fn test_chain_success_first_provider() {
        let primary = MockProvider::new("primary", Behavior::Answer("from primary"));
        let secondary = MockProvider::new("secondary", Behavior::Answer("from secondary"));
        let chain = ProviderChainBuilder::new("instruction")
            .add_shared(primary.clone(), SHORT)
            .add_shared(secondary.clone(), SHORT)
            .build();

        let resolution = chain.resolve(&question()).await;

        assert_eq!(resolution.answer, AiAnswer::from_provider("from primary", "primary"));
        assert_eq!(resolution.attempts.len(), 1);
        assert_eq!(secondary.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chain_fallback_on_failure() {
        let primary = MockProvider::new("primary", Behavior::Fail);
        let secondary = MockProvider::new("secondary", Behavior::Answer("from secondary"));
        let chain = ProviderChainBuilder::new("instruction")
            .add_shared(primary.clone(), SHORT)
            .add_shared(secondary.clone(), SHORT)
            .build();

        let resolution = chain.resolve(&question()).await;

        assert_eq!(resolution.answer.text, "from secondary");
        assert_eq!(resolution.answer.source.as_str(), "secondary");
        assert_eq!(resolution.attempts.len(), 2);
        assert_eq!(resolution.attempts[0].provider_id, "primary");
        assert!(!resolution.attempts[0].succeeded());
        assert!(resolution.attempts[1].succeeded());
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_chain_all_failed_returns_apology() {
        let chain = ProviderChainBuilder::new("instruction")
            .add_shared(MockProvider::new("primary", Behavior::Fail), SHORT)
            .add_shared(MockProvider::new("secondary", Behavior::Fail), SHORT)
            .build();

        let resolution = chain.resolve(&question()).await;

        assert!(resolution.answer.source.is_fallback());
        assert_eq!(resolution.answer.text, FALLBACK_MESSAGE);
        assert_eq!(resolution.attempts.len(), 2);
        assert!(resolution.attempts.iter().all(|a| !a.succeeded()));
    }

    #[tokio::test]
    async fn test_chain_timeout_counts_as_failure() {
        let chain = ProviderChainBuilder::new("instruction")
            .add_shared(
                MockProvider::new("primary", Behavior::Hang),
                Duration::from_millis(20),
            )
            .add_shared(MockProvider::new("secondary", Behavior::Answer("ok")), SHORT)
            .build();

        let resolution = chain.resolve(&question()).await;

        assert_eq!(resolution.answer.source.as_str(), "secondary");
        let failure = resolution.attempts[0].failure().unwrap();
        assert_eq!(failure.category, ErrorCategory::Timeout);
    }

    #[tokio::test]
    async fn test_chain_respects_rank_order() {
        let late = ProviderDescriptor::new(
            5,
            MockProvider::new("late", Behavior::Answer("late")),
            SHORT,
        );
        let early = ProviderDescriptor::new(
            1,
            MockProvider::new("early", Behavior::Answer("early")),
            SHORT,
        );
        let chain = ProviderChainBuilder::new("instruction")
            .add_descriptors([late, early])
            .build();

        assert_eq!(chain.provider_ids(), vec!["early", "late"]);
        assert_eq!(chain.resolve(&question()).await.answer.text, "early");
    }

    #[tokio::test]
    async fn test_empty_chain_falls_back() {
        let chain = ProviderChainBuilder::new("instruction")
            .fallback_text("sorry")
            .build();
        assert!(chain.is_empty());

        let resolution = chain.resolve(&question()).await;
        assert_eq!(resolution.answer, AiAnswer::fallback("sorry"));
        assert!(resolution.attempts.is_empty());
    }

    #[tokio::test]
    async fn test_health_report() {
        let chain = ProviderChainBuilder::new("instruction")
            .add_shared(MockProvider::new("up", Behavior::Answer("x")), SHORT)
            .add_shared(MockProvider::new("down", Behavior::Fail), SHORT)
            .build();

        let report = chain.health_report().await;
        assert_eq!(
            report,
            vec![("up".to_string(), true), ("down".to_string(), false)]
        );
    }
}
