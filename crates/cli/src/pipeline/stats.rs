//! Pipeline statistics.

use std::time::Duration;

use dispatcher::WorkerReport;

/// Statistics from a pipeline run
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Input lines read
    pub lines_read: u64,

    /// Lines that were not valid transfer records
    pub parse_errors: u64,

    /// Transfers handed to the worker
    pub transfers_sent: u64,

    /// Total duration of the run
    pub duration: Duration,

    /// Number of configured pages
    pub active_pages: usize,

    /// Number of configured sinks
    pub active_sinks: usize,

    /// Worker counters and per-series value summary
    pub report: WorkerReport,
}

impl PipelineStats {
    /// Transfers dispatched per second
    pub fn throughput(&self) -> f64 {
        if self.duration.as_secs_f64() > 0.0 {
            self.report.counters.transfers as f64 / self.duration.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Share of dispatched transfers that aborted, as percentage
    pub fn failure_rate(&self) -> f64 {
        let total = self.report.counters.transfers;
        if total > 0 {
            (self.report.counters.failures as f64 / total as f64) * 100.0
        } else {
            0.0
        }
    }

    /// Print detailed summary
    pub fn print_summary(&self) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Dispatch Statistics                       ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");

        let counters = &self.report.counters;

        println!("📊 Overview");
        println!("   ├─ Duration: {:.2}s", self.duration.as_secs_f64());
        println!("   ├─ Lines read: {}", self.lines_read);
        println!("   ├─ Malformed lines: {}", self.parse_errors);
        println!("   ├─ Transfers: {}", counters.transfers);
        println!("   ├─ Throughput: {:.2}/s", self.throughput());
        println!("   ├─ Active pages: {}", self.active_pages);
        println!("   └─ Active sinks: {}", self.active_sinks);

        println!("\n📈 Dispatch");
        println!("   ├─ Samples emitted: {}", counters.samples);
        println!(
            "   ├─ Aborted dispatches: {} ({:.2}%)",
            counters.failures,
            self.failure_rate()
        );
        println!("   └─ Unknown pages: {}", counters.unknown_pages);

        if !self.report.summary.series.is_empty() {
            println!("\n{}", self.report.summary);
        }

        println!();
    }
}
