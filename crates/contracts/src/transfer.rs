//! TransferStats trait - transfer-statistics source abstraction
//!
//! A completed transfer exposes named numeric measurements. The dispatcher
//! only ever reads through this trait, so real clients and recorded
//! snapshots are handled the same way.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::InfoKey;

/// Failure reported by a statistics source
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StatsError {
    /// The source has no value for this key
    #[error("no value for {0}")]
    Missing(InfoKey),

    /// The value exists but has a different representation
    #[error("{key} is not available as {expected}")]
    TypeMismatch { key: InfoKey, expected: &'static str },

    /// The source could not produce the value
    #[error("{key} unavailable: {message}")]
    Unavailable { key: InfoKey, message: String },
}

/// Statistics of one completed transfer
///
/// Implementations must not block; all values are expected to be known
/// once the transfer has completed.
pub trait TransferStats {
    /// Fetch a floating point statistic
    fn get_double(&self, key: InfoKey) -> Result<f64, StatsError>;

    /// Fetch a native integer statistic
    fn get_long(&self, key: InfoKey) -> Result<i64, StatsError>;
}

/// Raw value held by a snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatValue {
    Long(i64),
    Double(f64),
}

/// Recorded statistics of a completed transfer
///
/// Deserializes from a plain map, e.g. `{"total_time": 1.23, "num_connects": 3}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransferSnapshot {
    values: HashMap<InfoKey, StatValue>,
}

impl TransferSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter for a floating point value
    pub fn with_double(mut self, key: InfoKey, value: f64) -> Self {
        self.values.insert(key, StatValue::Double(value));
        self
    }

    /// Builder-style setter for an integer value
    pub fn with_long(mut self, key: InfoKey, value: i64) -> Self {
        self.values.insert(key, StatValue::Long(value));
        self
    }

    pub fn insert(&mut self, key: InfoKey, value: StatValue) {
        self.values.insert(key, value);
    }

    pub fn get(&self, key: InfoKey) -> Option<StatValue> {
        self.values.get(&key).copied()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl TransferStats for TransferSnapshot {
    fn get_double(&self, key: InfoKey) -> Result<f64, StatsError> {
        match self.get(key) {
            Some(StatValue::Double(v)) => Ok(v),
            // Recorded JSON loses the distinction for whole numbers
            Some(StatValue::Long(v)) => Ok(v as f64),
            None => Err(StatsError::Missing(key)),
        }
    }

    fn get_long(&self, key: InfoKey) -> Result<i64, StatsError> {
        match self.get(key) {
            Some(StatValue::Long(v)) => Ok(v),
            Some(StatValue::Double(_)) => Err(StatsError::TypeMismatch {
                key,
                expected: "integer",
            }),
            None => Err(StatsError::Missing(key)),
        }
    }
}
