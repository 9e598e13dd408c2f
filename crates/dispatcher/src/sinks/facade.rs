//! MetricsSink - forwards samples to the `metrics` facade
//!
//! With the Prometheus exporter installed (see `observability`), every
//! sample becomes a labelled gauge.

use contracts::{ContractError, MetricSample, MetricSink};
use metrics::gauge;
use std::collections::HashMap;

const DEFAULT_METRIC_NAME: &str = "curl_stats_value";

/// Sink that records samples as `metrics` gauges
pub struct MetricsSink {
    name: String,
    metric_name: String,
}

impl MetricsSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            metric_name: DEFAULT_METRIC_NAME.to_string(),
        }
    }

    /// Create from params map (for factory)
    ///
    /// `metric_name` overrides the gauge name.
    pub fn from_params(name: impl Into<String>, params: &HashMap<String, String>) -> Self {
        let mut sink = Self::new(name);
        if let Some(metric_name) = params.get("metric_name") {
            sink.metric_name = metric_name.clone();
        }
        sink
    }

    pub fn metric_name(&self) -> &str {
        &self.metric_name
    }
}

impl MetricSink for MetricsSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&mut self, sample: &MetricSample) -> Result<(), ContractError> {
        if !sample.value.is_finite() {
            return Err(ContractError::sink_write(
                &self.name,
                format!("non-finite value for '{}'", sample.type_instance),
            ));
        }

        gauge!(
            self.metric_name.clone(),
            "host" => sample.host.clone().unwrap_or_default(),
            "plugin" => sample.plugin.clone().unwrap_or_default(),
            "plugin_instance" => sample.plugin_instance.clone().unwrap_or_default(),
            "type" => sample.metric_type.as_str(),
            "type_instance" => sample.type_instance.clone()
        )
        .set(sample.value);

        Ok(())
    }
}
