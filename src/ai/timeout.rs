//! Timeout Helpers
//!
//! Wraps async operations in a wall-clock bound and converts expiry into
//! `GuideError::Timeout`, so a timed-out provider call surfaces exactly like
//! any other provider failure.
//!
//! ## Usage
//!
//! ```ignore
//! use crate::ai::timeout::with_timeout;
//!
//! let text = with_timeout(
//!     descriptor.timeout,
//!     provider.generate(question, instruction),
//!     "openai request",
//! ).await?;
//! ```

use std::future::Future;
use std::time::Duration;

use crate::types::{GuideError, Result};

/// Execute an async operation with a timeout
///
/// Returns a timeout error if the operation doesn't complete within the specified duration.
pub async fn with_timeout<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => result,
        Err(_) => Err(GuideError::timeout(operation_name, timeout)),
    }
}

/// Execute an async operation with a timeout, mapping the inner result
///
/// This variant accepts futures that return non-Result types and wraps them.
pub async fn with_timeout_map<T, F>(timeout: Duration, future: F, operation_name: &str) -> Result<T>
where
    F: Future<Output = T>,
{
    match tokio::time::timeout(timeout, future).await {
        Ok(result) => Ok(result),
        Err(_) => Err(GuideError::timeout(operation_name, timeout)),
    }
}
