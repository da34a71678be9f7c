//! Answer Telemetry
//!
//! Best-effort delivery of question/answer/rank records to an external
//! collector. Delivery runs as a detached task; its outcome is only logged and
//! can never alter a response that has already been decided.

mod emitter;

pub use emitter::{FormTelemetry, wait_for_delivery};

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::TelemetryConfig;
use crate::types::{Result, TelemetryRecord};

/// Shared telemetry sink
pub type SharedTelemetry = Arc<dyn TelemetrySink>;

/// Fire-and-forget destination for telemetry records
pub trait TelemetrySink: Send + Sync {
    /// Hand off one record. Returns the delivery task when one was started;
    /// dropping the handle leaves the task running.
    fn emit(&self, record: TelemetryRecord) -> Option<JoinHandle<()>>;
}

/// Sink used when telemetry is switched off
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledTelemetry;

impl TelemetrySink for DisabledTelemetry {
    fn emit(&self, record: TelemetryRecord) -> Option<JoinHandle<()>> {
        debug!(rank = %record.rank, "Telemetry disabled, record dropped");
        None
    }
}

/// Build the sink described by configuration
pub fn create_sink(config: &TelemetryConfig) -> Result<SharedTelemetry> {
    if config.enabled {
        Ok(Arc::new(FormTelemetry::new(config)?))
    } else {
        Ok(Arc::new(DisabledTelemetry))
    }
}
