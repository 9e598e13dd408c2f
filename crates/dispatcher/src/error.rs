//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Sink creation error
    #[error("failed to create sink '{name}': {source}")]
    SinkCreation {
        name: String,
        #[source]
        source: std::io::Error,
    },

    /// Page statistics could not be built
    #[error("invalid statistics for page '{page}': {source}")]
    PageConfig {
        page: String,
        #[source]
        source: contracts::ContractError,
    },
}

impl DispatcherError {
    /// Create a sink creation error
    pub fn sink_creation(name: impl Into<String>, source: std::io::Error) -> Self {
        Self::SinkCreation {
            name: name.into(),
            source,
        }
    }
}
