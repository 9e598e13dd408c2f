//! # Dispatcher
//!
//! Turns the statistics of completed transfers into metric samples.
//!
//! - `dispatch`: one call per completed transfer, enabled fields in registry order
//! - `sinks`: log, JSONL file, `metrics` facade and in-memory destinations
//! - `worker`: channel-fed background task with shared counters

pub mod counters;
pub mod dispatch;
pub mod error;
pub mod sinks;
pub mod worker;

pub use contracts::{MetricSample, MetricSink, TransferStats};
pub use counters::{CountersSnapshot, DispatchCounters};
pub use dispatch::{dispatch, DispatchMeta, PageStats};
pub use error::DispatcherError;
pub use sinks::{BoxedSink, FanoutSink, FileSink, FileSinkConfig, LogSink, MemorySink, MetricsSink};
pub use worker::{
    create_sink, create_worker, CompletedTransfer, StatsWorker, StatsWorkerBuilder, WorkerConfig,
    WorkerReport,
};
