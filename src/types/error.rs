//! Unified Error Type System
//!
//! Centralized error types for the entire application.
//! Provides error classification for provider attempt reporting.
//!
//! ## Error Categories
//!
//! - **Timeout**: Provider did not answer within its configured bound
//! - **Network**: Connectivity issues
//! - **RateLimit**: API rate limiting
//! - **Auth**: Authentication failures
//! - **Unavailable**: Provider unavailable
//! - **ParseError**: Response payload did not have the expected shape
//!
//! Every category makes the provider chain move on to the next provider.
//! Categories only decide how a failed attempt is reported.

use std::time::Duration;
use thiserror::Error;

// =============================================================================
// Error Categories
// =============================================================================

/// Error categories for provider attempt failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Call exceeded the provider's timeout
    Timeout,
    /// Rate limited by the provider
    RateLimit,
    /// Authentication failed
    Auth,
    /// Network/connectivity issues
    Network,
    /// Provider unavailable
    Unavailable,
    /// Request rejected as invalid
    BadRequest,
    /// Provider response could not be parsed
    ParseError,
    /// Temporary server issues
    Transient,
    /// Unknown error
    Unknown,
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "TIMEOUT"),
            Self::RateLimit => write!(f, "RATE_LIMIT"),
            Self::Auth => write!(f, "AUTH"),
            Self::Network => write!(f, "NETWORK"),
            Self::Unavailable => write!(f, "UNAVAILABLE"),
            Self::BadRequest => write!(f, "BAD_REQUEST"),
            Self::ParseError => write!(f, "PARSE_ERROR"),
            Self::Transient => write!(f, "TRANSIENT"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

// =============================================================================
// LLM Error
// =============================================================================

/// Structured provider failure with category and context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmError {
    /// Error category for reporting
    pub category: ErrorCategory,
    /// Detailed error message
    pub message: String,
    /// Provider that produced the error
    pub provider: Option<String>,
    /// HTTP status returned by the provider, when one was received
    pub status: Option<u16>,
}

impl std::fmt::Display for LlmError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(provider) = &self.provider {
            write!(f, "[{}:{}] {}", provider, self.category, self.message)
        } else {
            write!(f, "[{}] {}", self.category, self.message)
        }
    }
}

impl std::error::Error for LlmError {}

impl LlmError {
    /// Create a new LLM error
    pub fn new(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
            provider: None,
            status: None,
        }
    }

    /// Create error with provider context
    pub fn with_provider(
        category: ErrorCategory,
        message: impl Into<String>,
        provider: impl Into<String>,
    ) -> Self {
        Self {
            category,
            message: message.into(),
            provider: Some(provider.into()),
            status: None,
        }
    }

    /// Add provider context to existing error
    pub fn provider(mut self, provider: impl Into<String>) -> Self {
        self.provider = Some(provider.into());
        self
    }

    /// Attach the HTTP status that caused the failure
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }
}

// =============================================================================
// Error Classifier
// =============================================================================

/// Maps raw failures onto error categories
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classify an HTTP status code returned by a provider
    pub fn classify_http_status(status: u16, message: &str, provider: &str) -> LlmError {
        let category = match status {
            429 => ErrorCategory::RateLimit,
            401 | 403 => ErrorCategory::Auth,
            400 | 422 => ErrorCategory::BadRequest,
            404 => ErrorCategory::Unavailable,
            500 | 502 | 503 | 504 => ErrorCategory::Transient,
            _ => ErrorCategory::Unknown,
        };
        LlmError::with_provider(category, message, provider).status(status)
    }

    /// Classify an application error raised while calling a provider
    pub fn classify_guide_error(err: &GuideError, provider: &str) -> LlmError {
        match err {
            GuideError::Llm(llm_err) => llm_err.clone().provider(provider),
            GuideError::Timeout { .. } => {
                LlmError::with_provider(ErrorCategory::Timeout, err.to_string(), provider)
            }
            GuideError::Http(http_err) if http_err.is_timeout() => {
                LlmError::with_provider(ErrorCategory::Timeout, err.to_string(), provider)
            }
            GuideError::Http(http_err) if http_err.is_decode() => {
                LlmError::with_provider(ErrorCategory::ParseError, err.to_string(), provider)
            }
            GuideError::Http(_) | GuideError::Io(_) => {
                LlmError::with_provider(ErrorCategory::Network, err.to_string(), provider)
            }
            GuideError::Json(_) => {
                LlmError::with_provider(ErrorCategory::ParseError, err.to_string(), provider)
            }
            _ => LlmError::with_provider(ErrorCategory::Unknown, err.to_string(), provider),
        }
    }
}

// =============================================================================
// Application Error
// =============================================================================

#[derive(Debug, Error)]
pub enum GuideError {
    // -------------------------------------------------------------------------
    // System Errors (auto From impl)
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // -------------------------------------------------------------------------
    // Caller-visible Errors
    // -------------------------------------------------------------------------
    /// Missing or blank question
    #[error("Question is empty")]
    EmptyQuestion,

    /// No provider had usable credentials at startup
    #[error("No provider is configured with credentials")]
    NoProviders,

    // -------------------------------------------------------------------------
    // Provider Errors
    // -------------------------------------------------------------------------
    /// Structured provider error with category
    #[error("LLM error: {0}")]
    Llm(LlmError),

    /// Operation timeout with context
    #[error("Timeout after {duration:?}: {operation}")]
    Timeout {
        operation: String,
        duration: Duration,
    },

    // -------------------------------------------------------------------------
    // Domain Errors
    // -------------------------------------------------------------------------
    #[error("Config error: {0}")]
    Config(String),

    #[error("Telemetry delivery failed: {0}")]
    Telemetry(String),
}

impl From<LlmError> for GuideError {
    fn from(err: LlmError) -> Self {
        GuideError::Llm(err)
    }
}

pub type Result<T> = std::result::Result<T, GuideError>;

// =============================================================================
// Helper Functions
// =============================================================================

impl GuideError {
    /// Create a timeout error
    pub fn timeout(operation: impl Into<String>, duration: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            duration,
        }
    }

    /// Create an LLM error with category
    pub fn llm_with_category(category: ErrorCategory, message: impl Into<String>) -> Self {
        Self::Llm(LlmError::new(category, message))
    }

    /// HTTP status code this error maps to when it reaches a caller
    pub fn http_status(&self) -> u16 {
        match self {
            Self::EmptyQuestion => 400,
            Self::NoProviders => 503,
            _ => 500,
        }
    }

    /// Whether the caller caused this error
    pub fn is_input_error(&self) -> bool {
        matches!(self, Self::EmptyQuestion)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_category_display() {
        assert_eq!(ErrorCategory::RateLimit.to_string(), "RATE_LIMIT");
        assert_eq!(ErrorCategory::Timeout.to_string(), "TIMEOUT");
        assert_eq!(ErrorCategory::Auth.to_string(), "AUTH");
    }

    #[test]
    fn test_classify_http_status() {
        let rate_limit = ErrorClassifier::classify_http_status(429, "Rate limited", "test");
        assert_eq!(rate_limit.category, ErrorCategory::RateLimit);
        assert_eq!(rate_limit.status, Some(429));

        let auth = ErrorClassifier::classify_http_status(401, "Unauthorized", "test");
        assert_eq!(auth.category, ErrorCategory::Auth);

        let server_error = ErrorClassifier::classify_http_status(500, "Server error", "test");
        assert_eq!(server_error.category, ErrorCategory::Transient);

        let odd = ErrorClassifier::classify_http_status(418, "teapot", "test");
        assert_eq!(odd.category, ErrorCategory::Unknown);
    }

    #[test]
    fn test_classify_timeout() {
        let err = GuideError::timeout("openai request", Duration::from_secs(30));
        let classified = ErrorClassifier::classify_guide_error(&err, "openai");
        assert_eq!(classified.category, ErrorCategory::Timeout);
        assert_eq!(classified.provider.as_deref(), Some("openai"));
    }

    #[test]
    fn test_classify_keeps_structured_error() {
        let err = GuideError::llm_with_category(ErrorCategory::ParseError, "no content");
        let classified = ErrorClassifier::classify_guide_error(&err, "openrouter");
        assert_eq!(classified.category, ErrorCategory::ParseError);
        assert_eq!(classified.message, "no content");
        assert_eq!(classified.provider.as_deref(), Some("openrouter"));
    }

    #[test]
    fn test_http_status_mapping() {
        assert_eq!(GuideError::EmptyQuestion.http_status(), 400);
        assert_eq!(GuideError::NoProviders.http_status(), 503);
        assert_eq!(GuideError::Config("bad".into()).http_status(), 500);
        assert!(GuideError::EmptyQuestion.is_input_error());
        assert!(!GuideError::NoProviders.is_input_error());
    }

    #[test]
    fn test_llm_error_display() {
        let err = LlmError::with_provider(ErrorCategory::RateLimit, "Too many requests", "openai");
        assert_eq!(err.to_string(), "[openai:RATE_LIMIT] Too many requests");

        let err_no_provider = LlmError::new(ErrorCategory::Network, "Connection failed");
        assert_eq!(err_no_provider.to_string(), "[NETWORK] Connection failed");
    }
}
