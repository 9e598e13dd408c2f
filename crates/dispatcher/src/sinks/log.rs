//! LogSink - logs every sample via tracing

use contracts::{ContractError, MetricSample, MetricSink};
use tracing::info;

/// Sink that logs samples for debugging
pub struct LogSink {
    name: String,
}

impl LogSink {
    /// Create a new LogSink with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl MetricSink for LogSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&mut self, sample: &MetricSample) -> Result<(), ContractError> {
        info!(
            sink = %self.name,
            identifier = %sample.identifier(),
            value = sample.value,
            "MetricSample"
        );
        Ok(())
    }
}
