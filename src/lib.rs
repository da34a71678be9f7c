//! clubguide - Club Recommendation Chat Service
//!
//! Answers new students' questions about school clubs with an LLM, falling back
//! through an ordered list of providers and finally to a fixed apology text.
//!
//! ## Core Features
//!
//! - **Request Gate**: per-session throttle (one accepted question per 5 s)
//! - **Provider Chain**: ordered OpenAI-compatible providers, each with its own timeout
//! - **Response Analyzer**: rank of the promoted club in the generated ranking
//! - **Telemetry**: fire-and-forget question/answer/rank delivery to a form collector
//!
//! ## Quick Start
//!
//! ```ignore
//! use clubguide::{ConfigLoader, Orchestrator, SessionId};
//!
//! let config = ConfigLoader::load()?;
//! let orchestrator = Orchestrator::from_config(&config)?;
//! let reply = orchestrator
//!     .handle(&SessionId::generate(), Some("I like robotics"), chrono::Utc::now())
//!     .await?;
//! ```
//!
//! ## Modules
//!
//! - [`ai`]: provider abstraction, provider chain, system instruction
//! - [`analyzer`]: rank extraction from generated answers
//! - [`session`]: per-session request gate
//! - [`telemetry`]: answer telemetry delivery
//! - [`orchestrator`]: the end-to-end question pipeline
//! - [`server`]: HTTP surface
//! - [`config`]: layered configuration

pub mod ai;
pub mod analyzer;
pub mod cli;
pub mod config;
pub mod constants;
pub mod orchestrator;
pub mod server;
pub mod session;
pub mod telemetry;
pub mod types;

// =============================================================================
// Core Re-exports
// =============================================================================

// Configuration
pub use config::{Config, ConfigLoader};

// Error Types
pub use types::error::{ErrorCategory, GuideError, Result};

// Domain Types
pub use types::{AiAnswer, AnswerSource, Question, Rank, SessionId, TelemetryRecord};

// =============================================================================
// Pipeline Re-exports
// =============================================================================

pub use ai::{OpenAiCompatProvider, ProviderChain, ProviderChainBuilder, TextProvider};
pub use analyzer::RankExtractor;
pub use orchestrator::{AnsweredReply, Orchestrator, Reply};
pub use session::{Admission, RequestGate};
pub use telemetry::{FormTelemetry, TelemetrySink};
