//! Mapper configuration

use super::error::MapResult;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Behaviour switches for a [`Mapper`](super::Mapper)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapperConfig {
    /// Reject `create` calls carrying properties the class does not declare
    pub strict_properties: bool,

    /// Re-check every filtered property on nodes returned by an index lookup
    pub verify_index_hits: bool,
}

impl Default for MapperConfig {
    fn default() -> Self {
        Self {
            strict_properties: true,
            verify_index_hits: true,
        }
    }
}

impl MapperConfig {
    /// Parse a YAML document; missing keys keep their defaults
    pub fn from_yaml_str(yaml: &str) -> MapResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> MapResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&text)
    }
}
