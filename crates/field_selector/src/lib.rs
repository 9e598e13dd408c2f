//! # Field Selector
//!
//! Turns a statistics configuration block into an `EnabledFieldSet`.
//!
//! Responsibilities:
//! - Match configuration keys against the field registry (case-insensitive)
//! - Validate that every entry carries a single boolean-like value
//! - All-or-nothing construction: no set escapes a failed build
//!
//! # Example
//!
//! ```
//! use contracts::ConfigItem;
//! use field_selector::EnabledFieldSet;
//!
//! let config = ConfigItem::new("statistics")
//!     .with_child(ConfigItem::leaf("total_time", true))
//!     .with_child(ConfigItem::leaf("Size_Download", "yes"));
//!
//! let set = EnabledFieldSet::from_config(&config).unwrap();
//! assert_eq!(set.enabled_count(), 2);
//! ```

mod selector;

pub use contracts::{ConfigItem, FieldDescriptor, FIELDS};
pub use selector::EnabledFieldSet;
