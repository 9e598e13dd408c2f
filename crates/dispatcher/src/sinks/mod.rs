//! Sink implementations
//!
//! Contains LogSink, FileSink, MetricsSink, MemorySink, and the FanoutSink
//! that routes every sample to all configured sinks.

mod facade;
mod fanout;
mod file;
mod log;
mod memory;

pub use self::facade::MetricsSink;
pub use self::fanout::{BoxedSink, FanoutSink};
pub use self::file::{FileSink, FileSinkConfig};
pub use self::log::LogSink;
pub use self::memory::MemorySink;
