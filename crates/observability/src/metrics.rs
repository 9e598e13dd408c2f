//! Dispatch metrics
//!
//! Counters for dispatch outcomes plus an in-memory aggregator of emitted
//! sample values for run summaries.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};

use contracts::{MetricSample, MetricType};
use metrics::{counter, describe_counter, describe_histogram, histogram};

static METRICS_DESCRIBED: AtomicBool = AtomicBool::new(false);

/// Register metric descriptions (idempotent)
pub fn describe_metrics() {
    if METRICS_DESCRIBED.swap(true, Ordering::SeqCst) {
        return;
    }

    describe_counter!(
        "curl_stats_transfers_total",
        "Completed transfers processed, by page and status"
    );
    describe_counter!(
        "curl_stats_samples_total",
        "Metric samples emitted, by page"
    );
    describe_counter!(
        "curl_stats_dispatch_failures_total",
        "Dispatch calls aborted, by page and error kind"
    );
    describe_counter!(
        "curl_stats_unknown_page_total",
        "Transfers reported for pages that are not configured"
    );
    describe_histogram!(
        "curl_stats_dispatch_latency_us",
        "Time spent dispatching one transfer, in microseconds"
    );
}

/// Record a successful dispatch
pub fn record_transfer_dispatched(page: &str) {
    counter!(
        "curl_stats_transfers_total",
        "page" => page.to_string(),
        "status" => "success"
    )
    .increment(1);
}

/// Record one sample accepted by the sinks
pub fn record_sample_emitted(page: &str) {
    counter!("curl_stats_samples_total", "page" => page.to_string()).increment(1);
}

/// Record an aborted dispatch
pub fn record_dispatch_failure(page: &str, kind: &'static str) {
    counter!(
        "curl_stats_transfers_total",
        "page" => page.to_string(),
        "status" => "failure"
    )
    .increment(1);
    counter!(
        "curl_stats_dispatch_failures_total",
        "page" => page.to_string(),
        "kind" => kind
    )
    .increment(1);
}

/// Record a transfer for a page with no configuration
pub fn record_unknown_page(page: &str) {
    counter!("curl_stats_unknown_page_total", "page" => page.to_string()).increment(1);
}

/// Record dispatch latency
pub fn record_dispatch_latency_us(latency_us: f64) {
    histogram!("curl_stats_dispatch_latency_us").record(latency_us);
}

/// Aggregates emitted sample values per series
///
/// Series key: `plugin_instance/type_instance`.
#[derive(Debug, Clone, Default)]
pub struct FieldStatsAggregator {
    total_samples: u64,
    series: BTreeMap<String, (MetricType, RunningStats)>,
}

impl FieldStatsAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one emitted sample
    pub fn update(&mut self, sample: &MetricSample) {
        self.total_samples += 1;

        let key = format!(
            "{}/{}",
            sample.plugin_instance.as_deref().unwrap_or("-"),
            sample.type_instance
        );
        self.series
            .entry(key)
            .or_insert_with(|| (sample.metric_type, RunningStats::default()))
            .1
            .push(sample.value);
    }

    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Generate summary
    pub fn summary(&self) -> DispatchSummary {
        DispatchSummary {
            total_samples: self.total_samples,
            series: self
                .series
                .iter()
                .map(|(key, (metric_type, stats))| {
                    (key.clone(), (*metric_type, StatsSummary::from(stats)))
                })
                .collect(),
        }
    }

}

/// Per-series summary of a run
#[derive(Debug, Clone, Default)]
pub struct DispatchSummary {
    pub total_samples: u64,
    pub series: BTreeMap<String, (MetricType, StatsSummary)>,
}

impl std::fmt::Display for DispatchSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Dispatch Summary ===")?;
        writeln!(f, "Total samples: {}", self.total_samples)?;
        for (key, (metric_type, stats)) in &self.series {
            writeln!(f, "  {} [{}]: {}", key, metric_type, stats)?;
        }
        Ok(())
    }
}

/// Summary statistics
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.3}, max={:.3}, mean={:.3}, std={:.3} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// Online statistics (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// Add a value
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// Sample variance
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
