//! MetricSample and the MetricSink trait - Dispatcher output interface

use serde::{Deserialize, Serialize};

use crate::{ContractError, MetricType};

/// One emitted observation
///
/// `host`, `plugin` and `plugin_instance` are `None` when the caller left
/// them unset; sinks decide how to fill them in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_instance: Option<String>,

    /// Unit classification
    #[serde(rename = "type")]
    pub metric_type: MetricType,

    /// Optional prefix followed by the field name
    pub type_instance: String,

    pub value: f64,
}

impl MetricSample {
    /// Collectd-style identifier: `host/plugin-instance/type-type_instance`
    pub fn identifier(&self) -> String {
        let host = self.host.as_deref().unwrap_or("");
        let plugin = self.plugin.as_deref().unwrap_or("");
        let plugin_part = match self.plugin_instance.as_deref() {
            Some(instance) if !instance.is_empty() => format!("{plugin}-{instance}"),
            _ => plugin.to_string(),
        };
        format!(
            "{host}/{plugin_part}/{}-{}",
            self.metric_type, self.type_instance
        )
    }
}

/// Metric output trait
///
/// Submission is synchronous: when `submit` returns, the sample has been
/// accepted or rejected.
pub trait MetricSink {
    /// Sink name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Accept one sample
    ///
    /// # Errors
    /// Returns a sink error when the sample is rejected
    fn submit(&mut self, sample: &MetricSample) -> Result<(), ContractError>;

    /// Flush buffered output (if any)
    fn flush(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}

impl<S: MetricSink + ?Sized> MetricSink for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn submit(&mut self, sample: &MetricSample) -> Result<(), ContractError> {
        (**self).submit(sample)
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        (**self).flush()
    }
}
