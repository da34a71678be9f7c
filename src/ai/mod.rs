//! AI Integration Layer
//!
//! Text providers, the ordered provider chain, the system instruction and
//! timeout helpers.

pub mod prompt;
pub mod provider;
pub mod timeout;

pub use prompt::{ChatMessage, DEFAULT_SYSTEM_INSTRUCTION};
pub use provider::{
    ErrorCategory, ErrorClassifier, LlmError, OpenAiCompatProvider, ProviderChain,
    ProviderChainBuilder, ProviderDescriptor, SharedProvider, TextProvider, create_descriptors,
};
pub use timeout::{with_timeout, with_timeout_map};
