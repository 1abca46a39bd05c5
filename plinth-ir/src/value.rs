//! Configuration values.

use std::fmt;

use indexmap::IndexMap;
use serde::Serialize;

use crate::{OutputRef, ReferenceError, reference};

/// A configuration value attached to a descriptor.
///
/// String values may carry `${ResourceId.outputKey}` references, either as
/// the whole value or interpolated into a larger string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConfigValue {
    String(String),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    List(Vec<ConfigValue>),
    Map(IndexMap<String, ConfigValue>),
}

impl ConfigValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConfigValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConfigValue::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&IndexMap<String, ConfigValue>> {
        match self {
            ConfigValue::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Collect every output reference in this value, depth first.
    pub fn references(&self) -> Result<Vec<OutputRef>, ReferenceError> {
        let mut refs = Vec::new();
        self.collect_references(&mut refs)?;
        Ok(refs)
    }

    fn collect_references(&self, refs: &mut Vec<OutputRef>) -> Result<(), ReferenceError> {
        match self {
            ConfigValue::String(s) => refs.extend(reference::scan(s)?),
            ConfigValue::List(items) => {
                for item in items {
                    item.collect_references(refs)?;
                }
            }
            ConfigValue::Map(map) => {
                for value in map.values() {
                    value.collect_references(refs)?;
                }
            }
            ConfigValue::Integer(_) | ConfigValue::Float(_) | ConfigValue::Boolean(_) => {}
        }
        Ok(())
    }

    /// Rebuild this value with every string passed through `f`.
    pub fn try_map_strings<E>(
        &self,
        f: &mut impl FnMut(&str) -> Result<String, E>,
    ) -> Result<ConfigValue, E> {
        Ok(match self {
            ConfigValue::String(s) => ConfigValue::String(f(s)?),
            ConfigValue::List(items) => ConfigValue::List(
                items
                    .iter()
                    .map(|item| item.try_map_strings(f))
                    .collect::<Result<_, _>>()?,
            ),
            ConfigValue::Map(map) => {
                let mut out = IndexMap::with_capacity(map.len());
                for (key, value) in map {
                    out.insert(key.clone(), value.try_map_strings(f)?);
                }
                ConfigValue::Map(out)
            }
            other => other.clone(),
        })
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigValue::String(s) => write!(f, "{:?}", s),
            ConfigValue::Integer(i) => write!(f, "{}", i),
            ConfigValue::Float(x) => write!(f, "{}", x),
            ConfigValue::Boolean(b) => write!(f, "{}", b),
            ConfigValue::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            ConfigValue::Map(map) => {
                f.write_str("{ ")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{} = {}", key, value)?;
                }
                f.write_str(" }")
            }
        }
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        ConfigValue::String(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        ConfigValue::String(value)
    }
}

impl From<i64> for ConfigValue {
    fn from(value: i64) -> Self {
        ConfigValue::Integer(value)
    }
}

impl From<f64> for ConfigValue {
    fn from(value: f64) -> Self {
        ConfigValue::Float(value)
    }
}

impl From<bool> for ConfigValue {
    fn from(value: bool) -> Self {
        ConfigValue::Boolean(value)
    }
}

impl From<Vec<ConfigValue>> for ConfigValue {
    fn from(value: Vec<ConfigValue>) -> Self {
        ConfigValue::List(value)
    }
}

impl From<IndexMap<String, ConfigValue>> for ConfigValue {
    fn from(value: IndexMap<String, ConfigValue>) -> Self {
        ConfigValue::Map(value)
    }
}
