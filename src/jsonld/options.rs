//! Parser options
//!
//! Options can be built in code or loaded from YAML; every field has a
//! default, so a YAML file only needs the keys it changes.

use super::error::{JsonLdError, JsonLdResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Conversion settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserOptions {
    /// Accept `{"a": 1,}` and `[1,]`
    pub allow_trailing_commas: bool,
    /// Generated blank nodes are labeled `<prefix><counter>`
    pub blank_node_prefix: String,
    /// Deepest allowed container nesting
    pub max_depth: usize,
    /// Reject IRIs that do not parse; when off, plain terms such as `name`
    /// are taken as IRIs verbatim instead of being dropped
    pub validate_iris: bool,
    /// Extra compact-IRI prefixes, on top of the built-in ones
    pub prefixes: BTreeMap<String, String>,
    /// Bound of the async quad channel
    pub channel_capacity: usize,
    /// Bytes requested per read
    pub read_buffer_size: usize,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            allow_trailing_commas: true,
            blank_node_prefix: "b".to_string(),
            max_depth: 512,
            validate_iris: true,
            prefixes: BTreeMap::new(),
            channel_capacity: 1024,
            read_buffer_size: 8192,
        }
    }
}

impl ParserOptions {
    /// Parse options from a YAML document
    pub fn from_yaml_str(yaml: &str) -> JsonLdResult<Self> {
        serde_yaml::from_str(yaml).map_err(|e| JsonLdError::Config(e.to_string()))
    }

    /// Load options from a YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> JsonLdResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| JsonLdError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_yaml_str(&content)
    }

    /// Register an extra prefix
    pub fn with_prefix(mut self, prefix: impl Into<String>, iri: impl Into<String>) -> Self {
        self.prefixes.insert(prefix.into(), iri.into());
        self
    }

    /// Require strict JSON: no trailing commas
    pub fn strict(mut self) -> Self {
        self.allow_trailing_commas = false;
        self
    }
}
