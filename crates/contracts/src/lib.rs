//! # Contracts
//!
//! Frozen interface contracts, defining inter-module data structures and traits.
//! All business crates can only depend on this crate, reverse dependencies are prohibited.
//!
//! ## Data Flow
//! - `ConfigItem` tree -> `field_selector` -> `EnabledFieldSet`
//! - `TransferStats` + `FIELDS` -> `dispatcher` -> `MetricSample` -> `MetricSink`

mod blueprint;
mod config;
mod error;
mod registry;
mod sample;
mod transfer;

pub use blueprint::*;
pub use config::*;
pub use error::*;
pub use registry::*;
pub use sample::*;
pub use transfer::*;
