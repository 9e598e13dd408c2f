//! EnabledFieldSet - per-field enable flags, parallel-indexed to `FIELDS`

use std::fmt;

use contracts::{lookup, ConfigItem, ContractError, FieldDescriptor, FIELDS, FIELD_COUNT};
use tracing::{debug, instrument};

/// Which registry fields are collected
///
/// Index `i` corresponds to `FIELDS[i]`. Read-only once built.
#[derive(Clone, Copy, PartialEq, Eq, Default)]
pub struct EnabledFieldSet {
    enabled: [bool; FIELD_COUNT],
}

impl EnabledFieldSet {
    /// Set with every field disabled
    pub fn none() -> Self {
        Self::default()
    }

    /// Build from a configuration item whose children are `field = bool` entries
    ///
    /// Duplicate keys are allowed; the last value wins.
    ///
    /// # Errors
    /// - `UnknownField` if a key names no registry field
    /// - `InvalidValue` if an entry does not carry exactly one boolean-like value
    #[instrument(name = "field_selector_from_config", skip(config), fields(entries = config.children.len()))]
    pub fn from_config(config: &ConfigItem) -> Result<Self, ContractError> {
        let mut set = Self::none();

        for entry in &config.children {
            let (index, field) =
                lookup(&entry.key).ok_or_else(|| ContractError::unknown_field(&entry.key))?;
            let enabled = parse_flag(entry)?;

            debug!(field = field.name, enabled, "Statistics field configured");
            set.enabled[index] = enabled;
        }

        Ok(set)
    }

    /// Build from an optional configuration item
    ///
    /// `None` means statistics collection is disabled for this caller.
    pub fn from_optional(config: Option<&ConfigItem>) -> Result<Option<Self>, ContractError> {
        config.map(Self::from_config).transpose()
    }

    /// Whether the field at registry index `index` is enabled
    #[inline]
    pub fn is_enabled(&self, index: usize) -> bool {
        self.enabled.get(index).copied().unwrap_or(false)
    }

    /// Whether the named field is enabled (case-insensitive)
    pub fn is_enabled_by_name(&self, name: &str) -> bool {
        lookup(name).is_some_and(|(index, _)| self.enabled[index])
    }

    /// Enabled fields in registry order
    pub fn enabled_fields(&self) -> impl Iterator<Item = (usize, &'static FieldDescriptor)> + '_ {
        FIELDS
            .iter()
            .enumerate()
            .filter(move |(index, _)| self.enabled[*index])
    }

    pub fn enabled_count(&self) -> usize {
        self.enabled.iter().filter(|e| **e).count()
    }

    pub fn is_empty(&self) -> bool {
        self.enabled_count() == 0
    }
}

impl fmt::Debug for EnabledFieldSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.enabled_fields().map(|(_, field)| field.name))
            .finish()
    }
}

/// Resolve the single boolean value of a statistics entry
fn parse_flag(entry: &ConfigItem) -> Result<bool, ContractError> {
    if !entry.children.is_empty() {
        return Err(ContractError::invalid_value(
            &entry.key,
            "nested blocks are not allowed",
        ));
    }

    match entry.values.as_slice() {
        [value] => value.as_boolean().ok_or_else(|| {
            ContractError::invalid_value(
                &entry.key,
                format!("{} value is not a boolean", value.type_name()),
            )
        }),
        values => Err(ContractError::invalid_value(
            &entry.key,
            format!("got {} values", values.len()),
        )),
    }
}
