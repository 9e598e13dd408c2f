//! `run` command implementation.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{info, warn};

use crate::cli::RunArgs;
use crate::pipeline::{InputSource, Pipeline, PipelineConfig};

/// Execute the `run` command
pub async fn run_pipeline(args: &RunArgs) -> Result<()> {
    info!(config = %args.config.display(), "Loading configuration");

    // Validate config path
    if !args.config.exists() {
        anyhow::bail!("Configuration file not found: {}", args.config.display());
    }

    // Load and parse configuration
    let mut blueprint = config_loader::ConfigLoader::load_from_path(&args.config)
        .with_context(|| format!("Failed to load config from {}", args.config.display()))?;

    // Apply CLI overrides
    if let Some(ref hostname) = args.hostname {
        info!(hostname = %hostname, "Overriding hostname from CLI");
        blueprint.hostname = Some(hostname.clone());
    }

    info!(
        hostname = ?blueprint.hostname,
        plugin = %blueprint.plugin,
        pages = blueprint.pages.len(),
        sinks = blueprint.sinks.len(),
        "Configuration loaded"
    );

    // Dry run - just validate and exit
    if args.dry_run {
        info!("Dry run mode - configuration is valid, exiting");
        print_config_summary(&blueprint);
        return Ok(());
    }

    let pipeline_config = PipelineConfig {
        blueprint,
        input: InputSource::from_arg(&args.input),
        max_transfers: if args.max_transfers == 0 {
            None
        } else {
            Some(args.max_transfers)
        },
        timeout: if args.timeout == 0 {
            None
        } else {
            Some(Duration::from_secs(args.timeout))
        },
        buffer_size: args.buffer_size,
        metrics_port: if args.metrics_port == 0 {
            None
        } else {
            Some(args.metrics_port)
        },
    };

    let pipeline = Pipeline::new(pipeline_config);

    // Setup graceful shutdown handler
    let shutdown_signal = setup_shutdown_signal();

    info!("Starting dispatch...");

    tokio::select! {
        result = pipeline.run() => {
            match result {
                Ok(stats) => {
                    info!(
                        transfers = stats.transfers_sent,
                        samples = stats.report.counters.samples,
                        failures = stats.report.counters.failures,
                        duration_secs = stats.duration.as_secs_f64(),
                        "Dispatch completed"
                    );

                    stats.print_summary();
                }
                Err(e) => {
                    return Err(e).context("Dispatch run failed");
                }
            }
        }
        _ = shutdown_signal => {
            warn!("Received shutdown signal, stopping...");
        }
    }

    info!("curl-stats finished");
    Ok(())
}

/// Setup Ctrl+C and SIGTERM signal handlers
async fn setup_shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

/// Print configuration summary for dry-run mode
fn print_config_summary(blueprint: &contracts::AgentBlueprint) {
    println!("\n=== Configuration Summary ===\n");
    println!("Agent:");
    println!("  Plugin: {}", blueprint.plugin);
    if let Some(ref hostname) = blueprint.hostname {
        println!("  Hostname: {}", hostname);
    }

    println!("\nPages ({}):", blueprint.pages.len());
    for page in &blueprint.pages {
        let fields = page.statistics.as_ref().map_or(0, |s| s.len());
        println!(
            "  - {} (instance {}) - {} statistics entries",
            page.name,
            page.effective_plugin_instance(),
            fields
        );
    }

    if !blueprint.sinks.is_empty() {
        println!("\nSinks ({}):", blueprint.sinks.len());
        for sink in &blueprint.sinks {
            println!("  - {} ({:?})", sink.name, sink.sink_type);
        }
    }

    println!();
}
