//! Prompt Construction
//!
//! Every question is sent as a two-message conversation: the fixed system
//! instruction followed by the user's question. No history is carried over.

use serde::{Deserialize, Serialize};

/// Built-in club guide instruction, used unless configuration overrides it
pub const DEFAULT_SYSTEM_INSTRUCTION: &str = include_str!("system_instruction.md");

/// Chat message in the OpenAI wire format
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Build the stateless conversation for one question
pub fn conversation(system_instruction: &str, question: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(system_instruction),
        ChatMessage::user(question),
    ]
}
