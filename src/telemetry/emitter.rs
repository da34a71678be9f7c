//! Form Collector Emitter
//!
//! Posts each record once as a flat form-encoded field set (question, answer,
//! rank) to a form-response endpoint. No retries.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use super::TelemetrySink;
use crate::config::TelemetryConfig;
use crate::constants::telemetry::BODY_PREVIEW_CHARS;
use crate::types::{GuideError, Result, TelemetryRecord, truncate_chars};

/// Telemetry sink posting records to a form endpoint
#[derive(Debug, Clone)]
pub struct FormTelemetry {
    client: reqwest::Client,
    endpoint: Arc<str>,
    question_field: Arc<str>,
    answer_field: Arc<str>,
    rank_field: Arc<str>,
}

impl FormTelemetry {
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| GuideError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: Arc::from(config.endpoint.as_str()),
            question_field: Arc::from(config.question_field.as_str()),
            answer_field: Arc::from(config.answer_field.as_str()),
            rank_field: Arc::from(config.rank_field.as_str()),
        })
    }

    /// Deliver one record, awaiting the collector's answer
    pub async fn send(&self, record: &TelemetryRecord) -> Result<()> {
        let rank = record.rank.to_string();
        let fields = [
            (self.question_field.as_ref(), record.question.as_str()),
            (self.answer_field.as_ref(), record.answer_text.as_str()),
            (self.rank_field.as_ref(), rank.as_str()),
        ];

        let response = self
            .client
            .post(self.endpoint.as_ref())
            .form(&fields)
            .send()
            .await
            .map_err(|e| GuideError::Telemetry(format!("request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GuideError::Telemetry(format!(
                "collector returned {}: {}",
                status,
                truncate_chars(&body, BODY_PREVIEW_CHARS)
            )));
        }

        Ok(())
    }

    /// Deliver in a detached task; the outcome is only logged
    pub fn spawn(&self, record: TelemetryRecord) -> Option<JoinHandle<()>> {
        let Ok(runtime) = Handle::try_current() else {
            warn!("No async runtime available, telemetry record dropped");
            return None;
        };

        let emitter = self.clone();
        Some(runtime.spawn(async move {
            match emitter.send(&record).await {
                Ok(()) => info!(rank = %record.rank, "Telemetry delivered"),
                Err(e) => warn!(rank = %record.rank, error = %e, "Telemetry delivery failed"),
            }
        }))
    }
}

impl TelemetrySink for FormTelemetry {
    fn emit(&self, record: TelemetryRecord) -> Option<JoinHandle<()>> {
        self.spawn(record)
    }
}

/// Await a delivery task for at most `limit`, e.g. before a short-lived process exits
pub async fn wait_for_delivery(handle: JoinHandle<()>, limit: Duration) -> bool {
    crate::ai::timeout::with_timeout_map(limit, handle, "telemetry delivery")
        .await
        .map(|joined| joined.is_ok())
        .unwrap_or(false)
}
