//! AgentBlueprint - Config Loader output
//!
//! Describes the monitored pages, their statistics selection, and the output routing.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ConfigBlock;

/// Configuration version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConfigVersion {
    #[default]
    V1,
}

/// Complete agent configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBlueprint {
    /// Configuration version
    #[serde(default)]
    pub version: ConfigVersion,

    /// Host name attached to samples (unset = left to the sink)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,

    /// Plugin name attached to samples
    #[serde(default = "default_plugin")]
    pub plugin: String,

    /// Monitored pages
    #[serde(default)]
    pub pages: Vec<PageConfig>,

    /// Output routing
    #[serde(default)]
    pub sinks: Vec<SinkConfig>,
}

fn default_plugin() -> String {
    "curl".to_string()
}

/// One monitored endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageConfig {
    /// Unique page name, used as the default plugin instance
    pub name: String,

    /// Endpoint URL (informational)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Plugin instance override
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_instance: Option<String>,

    /// Prefix prepended to every type instance
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance_prefix: Option<String>,

    /// Field name -> boolean (absent = no statistics collected)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statistics: Option<ConfigBlock>,
}

impl PageConfig {
    /// Plugin instance used for samples of this page
    pub fn effective_plugin_instance(&self) -> &str {
        self.plugin_instance.as_deref().unwrap_or(&self.name)
    }
}

/// Sink configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinkConfig {
    /// Sink name
    pub name: String,

    /// Sink type
    pub sink_type: SinkType,

    /// Sink specific parameters
    #[serde(default)]
    pub params: HashMap<String, String>,
}

/// Sink type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SinkType {
    /// Structured log lines via tracing
    Log,
    /// JSON lines file
    File,
    /// `metrics` facade gauges (Prometheus exporter)
    Metrics,
    /// In-memory collector
    Memory,
}
