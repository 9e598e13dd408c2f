//! FanoutSink - routes every sample to a list of sinks

use contracts::{ContractError, MetricSample, MetricSink};
use tracing::warn;

/// Boxed sink usable from a worker task
pub type BoxedSink = Box<dyn MetricSink + Send>;

/// Sink that forwards each sample to all inner sinks in order
///
/// A failing sink does not starve the others: every sink sees the sample,
/// and the first failure is reported afterwards.
pub struct FanoutSink {
    name: String,
    sinks: Vec<BoxedSink>,
}

impl FanoutSink {
    pub fn new(name: impl Into<String>, sinks: Vec<BoxedSink>) -> Self {
        Self {
            name: name.into(),
            sinks,
        }
    }

    /// Names of inner sinks, in routing order
    pub fn sink_names(&self) -> Vec<&str> {
        self.sinks.iter().map(|s| s.name()).collect()
    }

    fn for_each<F>(&mut self, mut op: F) -> Result<(), ContractError>
    where
        F: FnMut(&mut BoxedSink) -> Result<(), ContractError>,
    {
        let mut first_error = None;
        for sink in &mut self.sinks {
            if let Err(e) = op(sink) {
                warn!(sink = %sink.name(), error = %e, "Inner sink failed");
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

impl MetricSink for FanoutSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&mut self, sample: &MetricSample) -> Result<(), ContractError> {
        self.for_each(|sink| sink.submit(sample))
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.for_each(|sink| sink.flush())
    }
}
