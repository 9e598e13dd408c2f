//! MemorySink - keeps samples in memory

use contracts::{ContractError, MetricSample, MetricSink};

/// Sink that collects samples in a `Vec`
///
/// Optionally rejects every sample after the first `n` accepted ones.
#[derive(Debug, Default)]
pub struct MemorySink {
    name: String,
    samples: Vec<MetricSample>,
    fail_after: Option<usize>,
}

impl MemorySink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            samples: Vec::new(),
            fail_after: None,
        }
    }

    /// Reject samples once `n` have been accepted
    pub fn fail_after(mut self, n: usize) -> Self {
        self.fail_after = Some(n);
        self
    }

    pub fn samples(&self) -> &[MetricSample] {
        &self.samples
    }
}

impl MetricSink for MemorySink {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&mut self, sample: &MetricSample) -> Result<(), ContractError> {
        if self.fail_after.is_some_and(|n| self.samples.len() >= n) {
            return Err(ContractError::sink_write(&self.name, "capacity reached"));
        }
        self.samples.push(sample.clone());
        Ok(())
    }
}
