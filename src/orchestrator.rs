//! Question Orchestrator
//!
//! Runs one question through the full pipeline:
//!
//! 1. Validate the question (blank input never reaches the gate)
//! 2. Refuse when no provider is configured
//! 3. Admit or throttle the session
//! 4. Resolve through the provider chain
//! 5. Extract the rank and hand telemetry off, provider answers only
//!
//! The reply is decided before telemetry runs; delivery cannot change it.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, info, instrument};

use crate::ai::provider::{ProviderChain, ProviderChainBuilder, create_descriptors};
use crate::analyzer::RankExtractor;
use crate::config::Config;
use crate::session::{Admission, RequestGate};
use crate::telemetry::{SharedTelemetry, create_sink};
use crate::types::{
    AiAnswer, GuideError, ProviderAttempt, Question, Rank, Result, SessionId, TelemetryRecord,
};

/// Outcome of a handled question
#[derive(Debug)]
pub enum Reply {
    Answered(AnsweredReply),
    Throttled { retry_after: Duration },
}

impl Reply {
    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled { .. })
    }
}

/// Answer to an admitted question
#[derive(Debug)]
pub struct AnsweredReply {
    pub answer: AiAnswer,
    /// Rank of the promoted club; always 0 for the fallback answer
    pub rank: Rank,
    pub attempts: Vec<ProviderAttempt>,
    /// Telemetry delivery task, if one was started. Dropping it detaches.
    pub telemetry: Option<JoinHandle<()>>,
}

/// Shared orchestrator handle
pub type SharedOrchestrator = Arc<Orchestrator>;

pub struct Orchestrator {
    chain: ProviderChain,
    gate: RequestGate,
    extractor: RankExtractor,
    telemetry: SharedTelemetry,
}

impl Orchestrator {
    pub fn new(
        chain: ProviderChain,
        gate: RequestGate,
        extractor: RankExtractor,
        telemetry: SharedTelemetry,
    ) -> Self {
        Self {
            chain,
            gate,
            extractor,
            telemetry,
        }
    }

    /// Wire every component from a validated configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let chain = ProviderChainBuilder::new(config.prompt.system_instruction.clone())
            .add_descriptors(create_descriptors(&config.providers))
            .build();
        let telemetry = create_sink(&config.telemetry)?;

        info!(
            providers = ?chain.provider_ids(),
            window_secs = config.throttle.window_secs,
            telemetry = config.telemetry.enabled,
            "Orchestrator ready"
        );

        Ok(Self::new(
            chain,
            RequestGate::from_secs_f64(config.throttle.window_secs),
            RankExtractor::new(config.prompt.marker.clone()),
            telemetry,
        ))
    }

    pub fn chain(&self) -> &ProviderChain {
        &self.chain
    }

    pub fn gate(&self) -> &RequestGate {
        &self.gate
    }

    /// Forget the session's throttle timestamp
    pub fn reset_session(&self, session: &SessionId) {
        debug!(session = %session, "Session reset");
        self.gate.reset(session);
    }

    /// Handle one question from `session` arriving at `now`
    #[instrument(skip(self, session, raw_question, now), fields(session = %session))]
    pub async fn handle(
        &self,
        session: &SessionId,
        raw_question: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<Reply> {
        let question = Question::parse(raw_question)?;

        if self.chain.is_empty() {
            return Err(GuideError::NoProviders);
        }

        if let Admission::Throttled { retry_after } = self.gate.admit(session, now) {
            info!(
                retry_after_ms = retry_after.as_millis() as u64,
                "Question throttled"
            );
            return Ok(Reply::Throttled { retry_after });
        }

        let resolution = self.chain.resolve(&question).await;
        let answer = resolution.answer;

        let (rank, telemetry) = if answer.source.is_fallback() {
            (Rank::NONE, None)
        } else {
            let rank = self.extractor.extract(&answer.text);
            let handle = TelemetryRecord::for_answer(question.as_str(), &answer, rank)
                .and_then(|record| self.telemetry.emit(record));
            (rank, handle)
        };

        info!(
            source = %answer.source,
            rank = %rank,
            attempts = resolution.attempts.len(),
            "Question answered"
        );

        Ok(Reply::Answered(AnsweredReply {
            answer,
            rank,
            attempts: resolution.attempts,
            telemetry,
        }))
    }
}
