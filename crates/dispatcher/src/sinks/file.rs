//! FileSink - appends samples to a JSON lines file

use chrono::{DateTime, Utc};
use contracts::{ContractError, MetricSample, MetricSink};
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::PathBuf;
use tracing::{debug, instrument};

/// Configuration for FileSink
#[derive(Debug, Clone)]
pub struct FileSinkConfig {
    /// Output file
    pub path: PathBuf,
    /// Truncate an existing file instead of appending
    pub truncate: bool,
}

impl FileSinkConfig {
    /// Create config from params map
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        let path = params
            .get("path")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("./curl_stats.jsonl"));
        let truncate = params
            .get("truncate")
            .is_some_and(|v| v.eq_ignore_ascii_case("true"));

        Self { path, truncate }
    }
}

/// One output line: emission time plus the sample
#[derive(Serialize)]
struct Record<'a> {
    time: DateTime<Utc>,
    #[serde(flatten)]
    sample: &'a MetricSample,
}

/// Sink that writes samples to disk
pub struct FileSink {
    name: String,
    config: FileSinkConfig,
    writer: BufWriter<File>,
}

impl FileSink {
    /// Create a new FileSink, creating parent directories as needed
    #[instrument(name = "file_sink_new", skip(name, config), fields(path = %config.path.display()))]
    pub fn new(name: impl Into<String>, config: FileSinkConfig) -> std::io::Result<Self> {
        if let Some(parent) = config.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .append(!config.truncate)
            .truncate(config.truncate)
            .open(&config.path)?;

        debug!("FileSink opened");

        Ok(Self {
            name: name.into(),
            config,
            writer: BufWriter::new(file),
        })
    }

    /// Create from params map (for factory)
    pub fn from_params(
        name: impl Into<String>,
        params: &HashMap<String, String>,
    ) -> std::io::Result<Self> {
        Self::new(name, FileSinkConfig::from_params(params))
    }

    fn write_line(&mut self, sample: &MetricSample) -> std::io::Result<()> {
        let record = Record {
            time: Utc::now(),
            sample,
        };
        serde_json::to_writer(&mut self.writer, &record)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        self.writer.write_all(b"\n")
    }
}

impl MetricSink for FileSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn submit(&mut self, sample: &MetricSample) -> Result<(), ContractError> {
        self.write_line(sample).map_err(|e| {
            ContractError::sink_write(
                &self.name,
                format!("{}: {}", self.config.path.display(), e),
            )
        })
    }

    fn flush(&mut self) -> Result<(), ContractError> {
        self.writer
            .flush()
            .map_err(|e| ContractError::sink_write(&self.name, e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::MetricType;
    use tempfile::tempdir;

    fn sample(type_instance: &str, value: f64) -> MetricSample {
        MetricSample {
            host: Some("web01".to_string()),
            plugin: Some("curl".to_string()),
            plugin_instance: Some("home".to_string()),
            metric_type: MetricType::Duration,
            type_instance: type_instance.to_string(),
            value,
        }
    }

    #[test]
    fn test_file_sink_writes_lines() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out").join("stats.jsonl");
        let config = FileSinkConfig {
            path: path.clone(),
            truncate: false,
        };

        let mut sink = FileSink::new("test_file", config).unwrap();
        sink.submit(&sample("total_time", 1.5)).unwrap();
        sink.submit(&sample("connect_time", 0.25)).unwrap();
        sink.flush().unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["type"], "duration");
        assert_eq!(first["type_instance"], "total_time");
        assert_eq!(first["value"], 1.5);
        assert!(first["time"].is_string());
    }

    #[test]
    fn test_file_sink_appends() {
        let dir = tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert(
            "path".to_string(),
            dir.path().join("stats.jsonl").display().to_string(),
        );

        for _ in 0..2 {
            let mut sink = FileSink::from_params("f", &params).unwrap();
            sink.submit(&sample("total_time", 1.0)).unwrap();
            sink.flush().unwrap();
        }

        let content = fs::read_to_string(dir.path().join("stats.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
    }

    #[test]
    fn test_file_sink_truncates() {
        let dir = tempdir().unwrap();
        let mut params = HashMap::new();
        params.insert(
            "path".to_string(),
            dir.path().join("stats.jsonl").display().to_string(),
        );
        params.insert("truncate".to_string(), "true".to_string());

        for _ in 0..2 {
            let mut sink = FileSink::from_params("f", &params).unwrap();
            sink.submit(&sample("total_time", 1.0)).unwrap();
            sink.flush().unwrap();
        }

        let content = fs::read_to_string(dir.path().join("stats.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn test_config_defaults() {
        let config = FileSinkConfig::from_params(&HashMap::new());
        assert_eq!(config.path, PathBuf::from("./curl_stats.jsonl"));
        assert!(!config.truncate);
    }
}
