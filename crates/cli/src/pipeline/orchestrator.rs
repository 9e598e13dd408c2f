//! Pipeline orchestrator - feeds recorded transfers to the stats worker.
//!
//! Input is one `CompletedTransfer` JSON object per line. Malformed lines are
//! counted and skipped.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use contracts::AgentBlueprint;
use dispatcher::CompletedTransfer;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::PipelineStats;

/// Where completed transfers are read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputSource {
    Stdin,
    File(PathBuf),
}

impl InputSource {
    /// `-` selects stdin
    pub fn from_arg(path: &Path) -> Self {
        if path == Path::new("-") {
            Self::Stdin
        } else {
            Self::File(path.to_path_buf())
        }
    }
}

/// Pipeline configuration
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// The agent configuration
    pub blueprint: AgentBlueprint,

    /// Transfer records input
    pub input: InputSource,

    /// Maximum number of transfers to dispatch (None = unlimited)
    pub max_transfers: Option<u64>,

    /// Pipeline timeout (None = no timeout)
    pub timeout: Option<Duration>,

    /// Channel buffer size
    pub buffer_size: usize,

    /// Metrics server port (None = disabled)
    pub metrics_port: Option<u16>,
}

/// Main pipeline orchestrator
pub struct Pipeline {
    config: PipelineConfig,
}

impl Pipeline {
    /// Create a new pipeline with the given configuration
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Run until the input is exhausted, the limit is reached or the timeout fires
    pub async fn run(self) -> Result<PipelineStats> {
        let start_time = Instant::now();
        let blueprint = &self.config.blueprint;

        // Initialize Metrics (optional)
        if let Some(port) = self.config.metrics_port {
            observability::init_metrics_only(port)?;
            info!("Metrics endpoint available on port {}", port);
        }

        if blueprint.sinks.is_empty() {
            warn!("No sinks configured - samples will be dropped");
        }

        let reader = open_input(&self.config.input).await?;

        // Setup worker
        let (transfer_tx, transfer_rx) =
            mpsc::channel::<CompletedTransfer>(self.config.buffer_size.max(1));
        let worker = dispatcher::create_worker(blueprint, transfer_rx)
            .context("Failed to create stats worker")?;
        let worker_handle = worker.spawn();

        let mut stats = PipelineStats {
            active_pages: blueprint.pages.len(),
            active_sinks: blueprint.sinks.len(),
            ..Default::default()
        };

        info!(
            pages = stats.active_pages,
            sinks = stats.active_sinks,
            "Stats worker started"
        );

        let feed = feed_transfers(reader, transfer_tx, self.config.max_transfers, &mut stats);

        // Run with optional timeout; dropping the feed closes the channel
        let fed = match self.config.timeout {
            Some(timeout) => match tokio::time::timeout(timeout, feed).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(timeout_secs = timeout.as_secs(), "Input timed out");
                    Ok(())
                }
            },
            None => feed.await,
        };

        // Wait for the worker to drain and flush, even if input failed
        let report = worker_handle.await.context("Stats worker task failed")?;
        fed?;

        stats.report = report;
        stats.duration = start_time.elapsed();

        info!(
            duration_secs = stats.duration.as_secs_f64(),
            throughput = format!("{:.2}", stats.throughput()),
            "Pipeline shutdown complete"
        );

        Ok(stats)
    }
}

async fn open_input(input: &InputSource) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    match input {
        InputSource::Stdin => {
            info!("Reading transfers from stdin");
            Ok(Box::new(BufReader::new(tokio::io::stdin())))
        }
        InputSource::File(path) => {
            info!(path = %path.display(), "Reading transfers from file");
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open input {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
    }
}

/// Parse JSON lines and forward each transfer to the worker
async fn feed_transfers<R>(
    reader: R,
    tx: mpsc::Sender<CompletedTransfer>,
    max_transfers: Option<u64>,
    stats: &mut PipelineStats,
) -> Result<()>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();

    while let Some(line) = lines.next_line().await.context("Failed to read input")? {
        stats.lines_read += 1;

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let transfer = match serde_json::from_str::<CompletedTransfer>(line) {
            Ok(transfer) => transfer,
            Err(e) => {
                stats.parse_errors += 1;
                warn!(line = stats.lines_read, error = %e, "Skipping malformed transfer record");
                continue;
            }
        };

        debug!(page = %transfer.page, fields = transfer.stats.len(), "Transfer read");

        if tx.send(transfer).await.is_err() {
            warn!("Worker channel closed");
            break;
        }
        stats.transfers_sent += 1;

        if let Some(max) = max_transfers {
            if stats.transfers_sent >= max {
                info!(transfers = stats.transfers_sent, "Reached max transfers limit");
                break;
            }
        }
    }

    Ok(())
}
