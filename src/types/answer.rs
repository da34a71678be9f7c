//! Answer Domain Types
//!
//! Values that flow through one orchestration call: provider attempts, the
//! final answer with its source, the extracted rank and the telemetry record.

use serde::{Serialize, Serializer};
use std::fmt;

use super::error::LlmError;
use crate::constants::chain::FALLBACK_SOURCE;

// =============================================================================
// Answer Source
// =============================================================================

/// Where the final answer came from
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AnswerSource {
    /// A configured provider, by id
    Provider(String),
    /// The static apology text
    Fallback,
}

impl AnswerSource {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Provider(id) => id,
            Self::Fallback => FALLBACK_SOURCE,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback)
    }
}

impl fmt::Display for AnswerSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for AnswerSource {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Final answer surfaced for one question
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AiAnswer {
    pub text: String,
    pub source: AnswerSource,
}

impl AiAnswer {
    pub fn from_provider(text: impl Into<String>, provider_id: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: AnswerSource::Provider(provider_id.into()),
        }
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: AnswerSource::Fallback,
        }
    }
}

// =============================================================================
// Provider Attempts
// =============================================================================

/// Outcome of asking a single provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(String),
    Failure(LlmError),
}

/// One provider tried for one question. Lives only for the orchestration call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderAttempt {
    pub provider_id: String,
    pub outcome: AttemptOutcome,
    pub duration_ms: u64,
}

impl ProviderAttempt {
    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, AttemptOutcome::Success(_))
    }

    /// Failure reason, if the attempt failed
    pub fn failure(&self) -> Option<&LlmError> {
        match &self.outcome {
            AttemptOutcome::Failure(err) => Some(err),
            AttemptOutcome::Success(_) => None,
        }
    }
}

/// Result of resolving a question through the provider chain
#[derive(Debug, Clone)]
pub struct Resolution {
    pub answer: AiAnswer,
    /// Attempts in the order they were made
    pub attempts: Vec<ProviderAttempt>,
}

// =============================================================================
// Rank
// =============================================================================

/// Position of the promoted club in an answer's ranking, 0 when absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Rank(u8);

impl Rank {
    pub const NONE: Self = Self(0);
    pub const MAX: u8 = 3;

    /// Returns `None` for values outside 0..=3
    pub const fn new(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Self(value))
        } else {
            None
        }
    }

    pub const fn get(self) -> u8 {
        self.0
    }
}

impl fmt::Display for Rank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Telemetry Record
// =============================================================================

/// Question/answer/rank triple delivered once to the collector
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TelemetryRecord {
    pub question: String,
    pub answer_text: String,
    pub rank: Rank,
}

impl TelemetryRecord {
    /// Build a record for a provider answer. Fallback answers never produce one.
    pub fn for_answer(question: &str, answer: &AiAnswer, rank: Rank) -> Option<Self> {
        if answer.source.is_fallback() {
            return None;
        }
        Some(Self {
            question: question.to_string(),
            answer_text: answer.text.clone(),
            rank,
        })
    }
}
