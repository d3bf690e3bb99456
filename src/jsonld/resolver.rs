//! Key classification and IRI expansion

use crate::rdf::NamespaceManager;
use std::collections::BTreeMap;

/// Reserved JSON-LD keys the converter acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keyword {
    Id,
    Graph,
    Type,
    Value,
    Language,
    Context,
    /// Any other `@`-key; skipped with its value
    Other,
}

impl Keyword {
    /// Classify a key; `None` for ordinary (predicate) keys
    pub fn parse(key: &str) -> Option<Self> {
        if !key.starts_with('@') {
            return None;
        }
        Some(match key {
            "@id" => Keyword::Id,
            "@graph" => Keyword::Graph,
            "@type" => Keyword::Type,
            "@value" => Keyword::Value,
            "@language" => Keyword::Language,
            "@context" => Keyword::Context,
            _ => Keyword::Other,
        })
    }
}

/// Maps raw keys and IRI-valued strings to full IRI strings
pub trait KeyResolver: Send {
    /// Expand `key` to an IRI, or `None` if it does not denote one
    fn expand(&self, key: &str) -> Option<String>;
}

/// Resolver backed by a prefix table
///
/// `prefix:local` with a registered prefix is expanded and anything else
/// containing a `:` is taken as an absolute IRI. Plain terms do not resolve,
/// unless [`keep_plain_terms`](Self::keep_plain_terms) is set, in which case
/// they are used verbatim.
#[derive(Debug, Clone, Default)]
pub struct NamespaceResolver {
    namespaces: NamespaceManager,
    plain_terms: bool,
}

impl NamespaceResolver {
    /// Resolver with the built-in prefixes
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolver with the built-in prefixes plus `prefixes`
    pub fn with_prefixes(prefixes: &BTreeMap<String, String>) -> Self {
        let mut namespaces = NamespaceManager::new();
        for (prefix, iri) in prefixes {
            namespaces.add_prefix(prefix.clone(), iri.clone());
        }
        Self {
            namespaces,
            plain_terms: false,
        }
    }

    /// Pass keys without a `:` through as raw IRIs instead of dropping them
    pub fn keep_plain_terms(mut self, keep: bool) -> Self {
        self.plain_terms = keep;
        self
    }

    /// The underlying prefix table
    pub fn namespaces(&self) -> &NamespaceManager {
        &self.namespaces
    }
}

impl KeyResolver for NamespaceResolver {
    fn expand(&self, key: &str) -> Option<String> {
        let Some((prefix, local)) = key.split_once(':') else {
            return self.plain_terms.then(|| key.to_string());
        };
        // "http://..." style IRIs are never prefixed names
        if !local.starts_with("//") && self.namespaces.has_prefix(prefix) {
            return self.namespaces.expand(key).ok();
        }
        Some(key.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parse() {
        assert_eq!(Keyword::parse("@id"), Some(Keyword::Id));
        assert_eq!(Keyword::parse("@graph"), Some(Keyword::Graph));
        assert_eq!(Keyword::parse("@reverse"), Some(Keyword::Other));
        assert_eq!(Keyword::parse("http://ex.org/p"), None);
        assert_eq!(Keyword::parse("name"), None);
    }

    #[test]
    fn test_expand_absolute_and_compact() {
        let resolver = NamespaceResolver::new();
        assert_eq!(
            resolver.expand("http://ex.org/pred1").as_deref(),
            Some("http://ex.org/pred1")
        );
        assert_eq!(
            resolver.expand("foaf:name").as_deref(),
            Some("http://xmlns.com/foaf/0.1/name")
        );
        assert_eq!(resolver.expand("urn:isbn:123").as_deref(), Some("urn:isbn:123"));
        assert_eq!(resolver.expand("name"), None);
    }

    #[test]
    fn test_custom_prefixes() {
        let mut prefixes = BTreeMap::new();
        prefixes.insert("ex".to_string(), "http://example.org/".to_string());
        let resolver = NamespaceResolver::with_prefixes(&prefixes);
        assert_eq!(
            resolver.expand("ex:alice").as_deref(),
            Some("http://example.org/alice")
        );
        assert!(resolver.namespaces().has_prefix("rdf"));
    }

    #[test]
    fn test_plain_terms_kept_verbatim() {
        let resolver = NamespaceResolver::new().keep_plain_terms(true);
        assert_eq!(resolver.expand("name").as_deref(), Some("name"));
        assert_eq!(
            resolver.expand("foaf:name").as_deref(),
            Some("http://xmlns.com/foaf/0.1/name")
        );
    }
}
