//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// curl-stats - per-transfer HTTP timing and size statistics dispatcher
#[derive(Parser, Debug)]
#[command(
    name = "curl-stats",
    author,
    version,
    about = "Dispatch selected statistics of completed HTTP transfers",
    long_about = "Turns the statistics of completed HTTP transfers into metric samples.\n\n\
                  Each configured page selects which timing, size and speed fields are \n\
                  collected; selected fields are emitted to the configured sinks."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "CURL_STATS_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "CURL_STATS_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Dispatch statistics of recorded transfers
    Run(RunArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display configuration information
    Info(InfoArgs),

    /// List the statistics fields that can be selected
    Fields(FieldsArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON)
    #[arg(
        short,
        long,
        default_value = "curl_stats.toml",
        env = "CURL_STATS_CONFIG"
    )]
    pub config: PathBuf,

    /// Completed transfers as JSON lines ("-" reads stdin)
    #[arg(short, long, default_value = "-", env = "CURL_STATS_INPUT")]
    pub input: PathBuf,

    /// Override host name from configuration
    #[arg(long, env = "CURL_STATS_HOSTNAME")]
    pub hostname: Option<String>,

    /// Maximum number of transfers to dispatch (0 = unlimited)
    #[arg(long, default_value = "0", env = "CURL_STATS_MAX_TRANSFERS")]
    pub max_transfers: u64,

    /// Run timeout in seconds (0 = no timeout)
    #[arg(long, default_value = "0", env = "CURL_STATS_TIMEOUT")]
    pub timeout: u64,

    /// Validate configuration and exit without dispatching
    #[arg(long)]
    pub dry_run: bool,

    /// Channel buffer size between reader and worker
    #[arg(long, default_value = "100", env = "CURL_STATS_BUFFER_SIZE")]
    pub buffer_size: usize,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "CURL_STATS_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "curl_stats.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file
    #[arg(short, long, default_value = "curl_stats.toml")]
    pub config: PathBuf,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,

    /// Show the selected statistics fields of each page
    #[arg(long)]
    pub fields: bool,

    /// Show sink configuration
    #[arg(long)]
    pub sinks: bool,
}

/// Arguments for the `fields` command
#[derive(Parser, Debug)]
pub struct FieldsArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
