//! Worker counters for observability

use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome counters of a statistics worker
#[derive(Debug, Default)]
pub struct DispatchCounters {
    /// Completed transfers received
    transfers: AtomicU64,
    /// Samples accepted by the sinks, including those of aborted calls
    samples: AtomicU64,
    /// Dispatch calls that aborted
    failures: AtomicU64,
    /// Transfers for pages that are not configured
    unknown_pages: AtomicU64,
}

impl DispatchCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn transfers(&self) -> u64 {
        self.transfers.load(Ordering::Relaxed)
    }

    pub fn inc_transfers(&self) {
        self.transfers.fetch_add(1, Ordering::Relaxed);
    }

    pub fn samples(&self) -> u64 {
        self.samples.load(Ordering::Relaxed)
    }

    pub fn add_samples(&self, n: usize) {
        self.samples.fetch_add(n as u64, Ordering::Relaxed);
    }

    pub fn failures(&self) -> u64 {
        self.failures.load(Ordering::Relaxed)
    }

    pub fn inc_failures(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn unknown_pages(&self) -> u64 {
        self.unknown_pages.load(Ordering::Relaxed)
    }

    pub fn inc_unknown_pages(&self) {
        self.unknown_pages.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of all counters
    pub fn snapshot(&self) -> CountersSnapshot {
        CountersSnapshot {
            transfers: self.transfers(),
            samples: self.samples(),
            failures: self.failures(),
            unknown_pages: self.unknown_pages(),
        }
    }
}

/// Snapshot of worker counters (for reporting)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountersSnapshot {
    pub transfers: u64,
    pub samples: u64,
    pub failures: u64,
    pub unknown_pages: u64,
}
