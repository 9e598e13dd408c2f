//! StatsWorker - dispatches the statistics of each completed transfer
//!
//! Receives `CompletedTransfer`s over a channel and runs the dispatcher once
//! per transfer. A failed dispatch is logged and counted; the worker moves on
//! to the next transfer without retrying.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, instrument, warn};

use contracts::{
    AgentBlueprint, ContractError, MetricSample, MetricSink, PageConfig, SinkConfig, SinkType,
    TransferSnapshot,
};
use observability::{DispatchSummary, FieldStatsAggregator};

use crate::counters::{CountersSnapshot, DispatchCounters};
use crate::dispatch::PageStats;
use crate::error::DispatcherError;
use crate::sinks::{BoxedSink, FanoutSink, FileSink, LogSink, MemorySink, MetricsSink};

/// Statistics of one completed transfer, tagged with its page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletedTransfer {
    pub page: String,
    pub stats: TransferSnapshot,
}

/// Worker configuration
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    pub hostname: Option<String>,
    pub plugin: String,
    pub pages: Vec<PageConfig>,
    pub sinks: Vec<SinkConfig>,
}

impl From<&AgentBlueprint> for WorkerConfig {
    fn from(blueprint: &AgentBlueprint) -> Self {
        Self {
            hostname: blueprint.hostname.clone(),
            plugin: blueprint.plugin.clone(),
            pages: blueprint.pages.clone(),
            sinks: blueprint.sinks.clone(),
        }
    }
}

/// Builder for creating a StatsWorker
pub struct StatsWorkerBuilder {
    config: WorkerConfig,
    input_rx: mpsc::Receiver<CompletedTransfer>,
}

impl StatsWorkerBuilder {
    pub fn new(config: WorkerConfig, input_rx: mpsc::Receiver<CompletedTransfer>) -> Self {
        Self { config, input_rx }
    }

    /// Build page selectors and sinks
    ///
    /// # Errors
    /// The first invalid page statistics block or sink that cannot be created
    #[instrument(
        name = "stats_worker_build",
        skip(self),
        fields(pages = self.config.pages.len(), sinks = self.config.sinks.len())
    )]
    pub fn build(self) -> Result<StatsWorker, DispatcherError> {
        let pages = Self::build_pages(&self.config)?;

        let sinks = self
            .config
            .sinks
            .iter()
            .map(create_sink)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StatsWorker::new(pages, FanoutSink::new("worker", sinks), self.input_rx))
    }

    fn build_pages(config: &WorkerConfig) -> Result<Vec<PageStats>, DispatcherError> {
        config
            .pages
            .iter()
            .map(|page| {
                PageStats::from_page(page, config.hostname.as_deref(), &config.plugin).map_err(
                    |source| DispatcherError::PageConfig {
                        page: page.name.clone(),
                        source,
                    },
                )
            })
            .collect()
    }
}

/// Create a sink from configuration
#[instrument(
    name = "dispatcher_create_sink",
    skip(config),
    fields(sink = %config.name, sink_type = ?config.sink_type)
)]
pub fn create_sink(config: &SinkConfig) -> Result<BoxedSink, DispatcherError> {
    let sink: BoxedSink = match config.sink_type {
        SinkType::Log => Box::new(LogSink::new(&config.name)),
        SinkType::File => Box::new(
            FileSink::from_params(&config.name, &config.params)
                .map_err(|source| DispatcherError::sink_creation(&config.name, source))?,
        ),
        SinkType::Metrics => Box::new(MetricsSink::from_params(&config.name, &config.params)),
        SinkType::Memory => Box::new(MemorySink::new(&config.name)),
    };
    debug!("Sink created");
    Ok(sink)
}

/// Outcome of a worker run
#[derive(Debug, Clone, Default)]
pub struct WorkerReport {
    pub counters: CountersSnapshot,
    pub summary: DispatchSummary,
}

/// Forwards to the worker's sinks and records every accepted sample
///
/// Samples accepted before a dispatch aborts are counted too.
struct RecordingSink<'a, S: ?Sized> {
    page: &'a str,
    inner: &'a mut S,
    counters: &'a DispatchCounters,
    aggregator: &'a mut FieldStatsAggregator,
}

impl<S: MetricSink + ?Sized> MetricSink for RecordingSink<'_, S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn submit(&mut self, sample: &MetricSample) -> Result<(), ContractError> {
        self.inner.submit(sample)?;
        self.counters.add_samples(1);
        self.aggregator.update(sample);
        observability::record_sample_emitted(self.page);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.inner.flush()
    }
}

/// Consumes completed transfers and dispatches their statistics
pub struct StatsWorker {
    pages: HashMap<String, PageStats>,
    sink: FanoutSink,
    input_rx: mpsc::Receiver<CompletedTransfer>,
    counters: Arc<DispatchCounters>,
    aggregator: FieldStatsAggregator,
}

impl StatsWorker {
    /// Create a worker with prepared pages and sinks (also used by tests)
    pub fn new(
        pages: Vec<PageStats>,
        sink: FanoutSink,
        input_rx: mpsc::Receiver<CompletedTransfer>,
    ) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|page| (page.name().to_string(), page))
                .collect(),
            sink,
            input_rx,
            counters: Arc::new(DispatchCounters::new()),
            aggregator: FieldStatsAggregator::new(),
        }
    }

    /// Shared counters, readable while the worker runs
    pub fn counters(&self) -> Arc<DispatchCounters> {
        Arc::clone(&self.counters)
    }

    /// Run until the input channel is closed
    #[instrument(name = "stats_worker_run", skip(self))]
    pub async fn run(mut self) -> WorkerReport {
        info!(
            pages = self.pages.len(),
            sinks = ?self.sink.sink_names(),
            "Stats worker started"
        );

        while let Some(transfer) = self.input_rx.recv().await {
            self.handle_transfer(&transfer);

            let transfers = self.counters.transfers();
            if transfers % 100 == 0 {
                debug!(transfers, "Stats worker progress");
            }
        }

        if let Err(e) = self.sink.flush() {
            error!(error = %e, "Flush failed on shutdown");
        }

        let report = WorkerReport {
            counters: self.counters.snapshot(),
            summary: self.aggregator.summary(),
        };
        info!(
            transfers = report.counters.transfers,
            samples = report.counters.samples,
            failures = report.counters.failures,
            "Stats worker input closed, shutdown complete"
        );
        report
    }

    /// Spawn the worker as a background task
    pub fn spawn(self) -> JoinHandle<WorkerReport> {
        tokio::spawn(self.run())
    }

    fn handle_transfer(&mut self, transfer: &CompletedTransfer) {
        self.counters.inc_transfers();

        let Some(page) = self.pages.get(&transfer.page) else {
            warn!(page = %transfer.page, "Transfer for unknown page dropped");
            self.counters.inc_unknown_pages();
            observability::record_unknown_page(&transfer.page);
            return;
        };

        let mut sink = RecordingSink {
            page: page.name(),
            inner: &mut self.sink,
            counters: &self.counters,
            aggregator: &mut self.aggregator,
        };

        let started = Instant::now();
        let result = page.dispatch(&transfer.stats, &mut sink);
        observability::record_dispatch_latency_us(started.elapsed().as_secs_f64() * 1e6);

        match result {
            Ok(samples) => {
                debug!(page = %page.name(), samples, "Transfer dispatched");
                observability::record_transfer_dispatched(page.name());
            }
            Err(e) => {
                self.counters.inc_failures();
                observability::record_dispatch_failure(page.name(), e.kind());
                error!(page = %page.name(), error = %e, "Dispatch aborted");
            }
        }
    }
}

/// Convenience function to create a worker from a blueprint
pub fn create_worker(
    blueprint: &AgentBlueprint,
    input_rx: mpsc::Receiver<CompletedTransfer>,
) -> Result<StatsWorker, DispatcherError> {
    StatsWorkerBuilder::new(WorkerConfig::from(blueprint), input_rx).build()
}
