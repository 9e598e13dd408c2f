//! Generic configuration tree
//!
//! A key with zero or more typed values and optional child items. Any serde
//! map (TOML table, JSON object) can be read into a `ConfigBlock`, which keeps
//! entries in document order.

use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A single typed configuration value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConfigValue {
    Boolean(bool),
    Number(f64),
    String(String),
}

impl ConfigValue {
    /// Interpret the value as a boolean
    ///
    /// Accepts boolean literals and the strings "true"/"yes"/"on" and
    /// "false"/"no"/"off" (ASCII case-insensitive). Anything else is `None`.
    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::String(s) => parse_bool_str(s),
            Self::Number(_) => None,
        }
    }

    /// Short name of the value type (used in error messages)
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Boolean(_) => "boolean",
            Self::Number(_) => "number",
            Self::String(_) => "string",
        }
    }
}

impl From<bool> for ConfigValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<f64> for ConfigValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<&str> for ConfigValue {
    fn from(s: &str) -> Self {
        Self::String(s.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

fn parse_bool_str(s: &str) -> Option<bool> {
    const TRUE: [&str; 3] = ["true", "yes", "on"];
    const FALSE: [&str; 3] = ["false", "no", "off"];

    if TRUE.iter().any(|t| s.eq_ignore_ascii_case(t)) {
        Some(true)
    } else if FALSE.iter().any(|f| s.eq_ignore_ascii_case(f)) {
        Some(false)
    } else {
        None
    }
}

/// One node of the configuration tree
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigItem {
    pub key: String,
    pub values: Vec<ConfigValue>,
    pub children: Vec<ConfigItem>,
}

impl ConfigItem {
    /// Create an item with no values and no children
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Create a single-valued leaf item
    pub fn leaf(key: impl Into<String>, value: impl Into<ConfigValue>) -> Self {
        Self::new(key).with_value(value)
    }

    /// Append a value
    pub fn with_value(mut self, value: impl Into<ConfigValue>) -> Self {
        self.values.push(value.into());
        self
    }

    /// Append a child item
    pub fn with_child(mut self, child: ConfigItem) -> Self {
        self.children.push(child);
        self
    }

    /// Wrap a block's entries as the children of a named item
    pub fn from_block(key: impl Into<String>, block: &ConfigBlock) -> Self {
        Self {
            key: key.into(),
            values: Vec::new(),
            children: block.0.clone(),
        }
    }
}

/// Ordered list of configuration items read from a map
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConfigBlock(pub Vec<ConfigItem>);

impl ConfigBlock {
    pub fn items(&self) -> &[ConfigItem] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<ConfigItem>> for ConfigBlock {
    fn from(items: Vec<ConfigItem>) -> Self {
        Self(items)
    }
}

/// Shape of a map entry before it becomes a `ConfigItem`
#[derive(Deserialize)]
#[serde(untagged)]
enum ConfigNode {
    Value(ConfigValue),
    List(Vec<ConfigValue>),
    Block(ConfigBlock),
}

impl ConfigNode {
    fn into_item(self, key: String) -> ConfigItem {
        match self {
            Self::Value(v) => ConfigItem::leaf(key, v),
            Self::List(values) => ConfigItem {
                key,
                values,
                children: Vec::new(),
            },
            Self::Block(block) => ConfigItem {
                key,
                values: Vec::new(),
                children: block.0,
            },
        }
    }
}

struct ConfigBlockVisitor;

impl<'de> Visitor<'de> for ConfigBlockVisitor {
    type Value = ConfigBlock;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a table of configuration entries")
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut items = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, node)) = map.next_entry::<String, ConfigNode>()? {
            items.push(node.into_item(key));
        }
        Ok(ConfigBlock(items))
    }
}

impl<'de> Deserialize<'de> for ConfigBlock {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(ConfigBlockVisitor)
    }
}

impl Serialize for ConfigBlock {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for item in &self.0 {
            if !item.children.is_empty() {
                map.serialize_entry(&item.key, &ConfigBlock(item.children.clone()))?;
            } else if item.values.len() == 1 {
                map.serialize_entry(&item.key, &item.values[0])?;
            } else {
                map.serialize_entry(&item.key, &item.values)?;
            }
        }
        map.end()
    }
}
