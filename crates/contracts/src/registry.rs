//! Field Registry - the static table of extractable transfer statistics
//!
//! Table order is significant: it is both the validation order and the
//! emission order of dispatched samples.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{StatsError, TransferStats};

/// Identifier used to query a transfer-statistics source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InfoKey {
    TotalTime,
    NamelookupTime,
    ConnectTime,
    PretransferTime,
    SizeUpload,
    SizeDownload,
    SpeedDownload,
    SpeedUpload,
    HeaderSize,
    RequestSize,
    ContentLengthDownload,
    ContentLengthUpload,
    StarttransferTime,
    RedirectTime,
    RedirectCount,
    NumConnects,
    AppconnectTime,
}

impl InfoKey {
    /// Snake-case name, identical to the field's configuration key
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TotalTime => "total_time",
            Self::NamelookupTime => "namelookup_time",
            Self::ConnectTime => "connect_time",
            Self::PretransferTime => "pretransfer_time",
            Self::SizeUpload => "size_upload",
            Self::SizeDownload => "size_download",
            Self::SpeedDownload => "speed_download",
            Self::SpeedUpload => "speed_upload",
            Self::HeaderSize => "header_size",
            Self::RequestSize => "request_size",
            Self::ContentLengthDownload => "content_length_download",
            Self::ContentLengthUpload => "content_length_upload",
            Self::StarttransferTime => "starttransfer_time",
            Self::RedirectTime => "redirect_time",
            Self::RedirectCount => "redirect_count",
            Self::NumConnects => "num_connects",
            Self::AppconnectTime => "appconnect_time",
        }
    }
}

impl fmt::Display for InfoKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a raw value is fetched from the source and converted for emission
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionKind {
    /// Floating point value, emitted as-is
    Gauge,
    /// Floating point bytes/second, emitted as bits/second
    Rate,
    /// Native integer, widened to floating point
    IntegerCount,
}

impl ExtractionKind {
    /// Query the source for `key` and convert the raw value for emission
    ///
    /// Rates are reported by the source in bytes/second and emitted in bits/second.
    pub fn read(self, stats: &dyn TransferStats, key: InfoKey) -> Result<f64, StatsError> {
        match self {
            Self::Gauge => stats.get_double(key),
            Self::Rate => stats.get_double(key).map(|raw| raw * 8.0),
            Self::IntegerCount => stats.get_long(key).map(|raw| raw as f64),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Gauge => "gauge",
            Self::Rate => "rate",
            Self::IntegerCount => "integer_count",
        }
    }
}

/// Unit tag attached to emitted samples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricType {
    Duration,
    Bytes,
    Bitrate,
    Count,
}

impl MetricType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Duration => "duration",
            Self::Bytes => "bytes",
            Self::Bitrate => "bitrate",
            Self::Count => "count",
        }
    }
}

impl fmt::Display for MetricType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One extractable statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Configuration key and type-instance suffix
    pub name: &'static str,
    pub kind: ExtractionKind,
    pub metric_type: MetricType,
    pub key: InfoKey,
}

macro_rules! field {
    ($name:ident, $kind:ident, $metric_type:ident, $key:ident) => {
        FieldDescriptor {
            name: stringify!($name),
            kind: ExtractionKind::$kind,
            metric_type: MetricType::$metric_type,
            key: InfoKey::$key,
        }
    };
}

/// Number of known fields
pub const FIELD_COUNT: usize = 17;

/// All known fields, in emission order
pub static FIELDS: [FieldDescriptor; FIELD_COUNT] = [
    field!(total_time, Gauge, Duration, TotalTime),
    field!(namelookup_time, Gauge, Duration, NamelookupTime),
    field!(connect_time, Gauge, Duration, ConnectTime),
    field!(pretransfer_time, Gauge, Duration, PretransferTime),
    field!(size_upload, Gauge, Bytes, SizeUpload),
    field!(size_download, Gauge, Bytes, SizeDownload),
    field!(speed_download, Rate, Bitrate, SpeedDownload),
    field!(speed_upload, Rate, Bitrate, SpeedUpload),
    field!(header_size, IntegerCount, Bytes, HeaderSize),
    field!(request_size, IntegerCount, Bytes, RequestSize),
    field!(content_length_download, Gauge, Bytes, ContentLengthDownload),
    field!(content_length_upload, Gauge, Bytes, ContentLengthUpload),
    field!(starttransfer_time, Gauge, Duration, StarttransferTime),
    field!(redirect_time, Gauge, Duration, RedirectTime),
    field!(redirect_count, IntegerCount, Count, RedirectCount),
    field!(num_connects, IntegerCount, Count, NumConnects),
    field!(appconnect_time, Gauge, Duration, AppconnectTime),
];

/// Look up a field by name (ASCII case-insensitive, exact)
///
/// Returns the field's registry index together with its descriptor.
pub fn lookup(name: &str) -> Option<(usize, &'static FieldDescriptor)> {
    FIELDS
        .iter()
        .enumerate()
        .find(|(_, field)| field.name.eq_ignore_ascii_case(name))
}
