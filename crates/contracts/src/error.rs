//! Layered error definitions
//!
//! Categorized by source: config / selector / dispatch / sink

use thiserror::Error;

use crate::StatsError;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation {
        field: String,
        message: String,
        #[source]
        source: Option<Box<ContractError>>,
    },

    // ===== Selector Errors =====
    /// Statistics key does not name a known field
    #[error("unknown statistics field '{key}'")]
    UnknownField { key: String },

    /// Statistics key has the wrong arity or a non-boolean value
    #[error("'{key}' expects a single boolean argument: {message}")]
    InvalidValue { key: String, message: String },

    // ===== Dispatch Errors =====
    /// A required argument was not supplied
    #[error("invalid argument: {message}")]
    InvalidArgument { message: String },

    /// The statistics source failed to provide a field
    #[error("failed to extract '{field}': {source}")]
    Extraction {
        field: &'static str,
        #[source]
        source: StatsError,
    },

    /// The sink rejected a sample
    #[error("sink '{sink_name}' rejected '{field}': {message}")]
    Emission {
        field: String,
        sink_name: String,
        message: String,
    },

    // ===== Sink Errors =====
    /// Sink write error
    #[error("sink '{sink_name}' write error: {message}")]
    SinkWrite { sink_name: String, message: String },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
            source: None,
        }
    }

    /// Create unknown field error
    pub fn unknown_field(key: impl Into<String>) -> Self {
        Self::UnknownField { key: key.into() }
    }

    /// Create invalid value error
    pub fn invalid_value(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create sink write error
    pub fn sink_write(sink_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SinkWrite {
            sink_name: sink_name.into(),
            message: message.into(),
        }
    }

    /// Short classification used for logs and metric labels
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigParse { .. } => "config_parse",
            Self::ConfigValidation { .. } => "config_validation",
            Self::UnknownField { .. } => "unknown_field",
            Self::InvalidValue { .. } => "invalid_value",
            Self::InvalidArgument { .. } => "invalid_argument",
            Self::Extraction { .. } => "extraction",
            Self::Emission { .. } => "emission",
            Self::SinkWrite { .. } => "sink_write",
            Self::Io(_) => "io",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::InfoKey;

    #[test]
    fn test_messages_name_offender() {
        let err = ContractError::unknown_field("bogus");
        assert_eq!(err.to_string(), "unknown statistics field 'bogus'");

        let err = ContractError::Extraction {
            field: "connect_time",
            source: StatsError::Missing(InfoKey::ConnectTime),
        };
        assert!(err.to_string().contains("connect_time"));
        assert_eq!(err.kind(), "extraction");
    }
}
