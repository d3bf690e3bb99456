//! RDF namespace and prefix management
//!
//! This module handles namespace prefixes for compact IRI notation, and the
//! handful of vocabulary IRIs the JSON-LD converter emits on its own.

use std::collections::BTreeMap;
use thiserror::Error;

/// `rdf:` vocabulary
pub mod rdf {
    pub const NAMESPACE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
}

/// `xsd:` datatypes used for native JSON values
pub mod xsd {
    pub const NAMESPACE: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";
    pub const STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
}

/// Prefix errors
#[derive(Error, Debug)]
pub enum PrefixError {
    /// Unknown prefix
    #[error("Unknown prefix: {0}")]
    UnknownPrefix(String),

    /// Invalid IRI
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),
}

pub type PrefixResult<T> = Result<T, PrefixError>;

/// Namespace manager with common prefixes
#[derive(Debug, Clone)]
pub struct NamespaceManager {
    /// Prefix → IRI mappings
    prefixes: BTreeMap<String, String>,
}

impl NamespaceManager {
    /// Create a new namespace manager with common prefixes
    pub fn new() -> Self {
        let mut mgr = Self {
            prefixes: BTreeMap::new(),
        };

        // Add common RDF/RDFS/OWL prefixes
        mgr.add_prefix("rdf", rdf::NAMESPACE);
        mgr.add_prefix("rdfs", "http://www.w3.org/2000/01/rdf-schema#");
        mgr.add_prefix("xsd", xsd::NAMESPACE);
        mgr.add_prefix("owl", "http://www.w3.org/2002/07/owl#");
        mgr.add_prefix("foaf", "http://xmlns.com/foaf/0.1/");
        mgr.add_prefix("dc", "http://purl.org/dc/elements/1.1/");
        mgr.add_prefix("dcterms", "http://purl.org/dc/terms/");

        mgr
    }

    /// Add a prefix, replacing any earlier mapping for it
    pub fn add_prefix(&mut self, prefix: impl Into<String>, iri: impl Into<String>) {
        self.prefixes.insert(prefix.into(), iri.into());
    }

    /// Get IRI for a prefix
    pub fn get_iri(&self, prefix: &str) -> PrefixResult<&str> {
        self.prefixes
            .get(prefix)
            .map(|s| s.as_str())
            .ok_or_else(|| PrefixError::UnknownPrefix(prefix.to_string()))
    }

    /// Check whether a prefix is registered
    pub fn has_prefix(&self, prefix: &str) -> bool {
        self.prefixes.contains_key(prefix)
    }

    /// Expand a compact IRI (prefix:local) to full IRI
    pub fn expand(&self, compact_iri: &str) -> PrefixResult<String> {
        if let Some((prefix, local)) = compact_iri.split_once(':') {
            let iri = self.get_iri(prefix)?;
            Ok(format!("{}{}", iri, local))
        } else {
            Err(PrefixError::InvalidIri(compact_iri.to_string()))
        }
    }

    /// Compact an IRI using the longest matching namespace
    pub fn compact(&self, iri: &str) -> Option<String> {
        self.prefixes
            .iter()
            .filter(|(_, namespace_iri)| iri.starts_with(namespace_iri.as_str()))
            .max_by_key(|(_, namespace_iri)| namespace_iri.len())
            .map(|(prefix, namespace_iri)| format!("{}:{}", prefix, &iri[namespace_iri.len()..]))
    }
}

impl Default for NamespaceManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_common_prefixes() {
        let mgr = NamespaceManager::new();

        assert_eq!(mgr.get_iri("rdf").unwrap(), rdf::NAMESPACE);
        assert_eq!(
            mgr.get_iri("rdfs").unwrap(),
            "http://www.w3.org/2000/01/rdf-schema#"
        );
        assert_eq!(mgr.get_iri("xsd").unwrap(), xsd::NAMESPACE);
        assert!(mgr.has_prefix("foaf"));
        assert!(!mgr.has_prefix("http"));
    }

    #[test]
    fn test_expand() {
        let mgr = NamespaceManager::new();

        let expanded = mgr.expand("foaf:name").unwrap();
        assert_eq!(expanded, "http://xmlns.com/foaf/0.1/name");

        let expanded = mgr.expand("rdf:type").unwrap();
        assert_eq!(expanded, rdf::TYPE);

        assert!(matches!(mgr.expand("nope:x"), Err(PrefixError::UnknownPrefix(_))));
        assert!(matches!(mgr.expand("plain"), Err(PrefixError::InvalidIri(_))));
    }

    #[test]
    fn test_compact() {
        let mgr = NamespaceManager::new();

        let compacted = mgr.compact("http://xmlns.com/foaf/0.1/name");
        assert_eq!(compacted, Some("foaf:name".to_string()));

        let compacted = mgr.compact(xsd::INTEGER);
        assert_eq!(compacted, Some("xsd:integer".to_string()));

        assert_eq!(mgr.compact("urn:example:thing"), None);
    }

    #[test]
    fn test_compact_prefers_longest_namespace() {
        let mut mgr = NamespaceManager::new();
        mgr.add_prefix("ex", "http://example.org/");
        mgr.add_prefix("exv", "http://example.org/vocab/");

        assert_eq!(
            mgr.compact("http://example.org/vocab/name"),
            Some("exv:name".to_string())
        );
    }

    #[test]
    fn test_custom_prefix() {
        let mut mgr = NamespaceManager::new();
        mgr.add_prefix("ex", "http://example.org/");

        let expanded = mgr.expand("ex:alice").unwrap();
        assert_eq!(expanded, "http://example.org/alice");
    }
}
