//! Term construction
//!
//! The converter decides *which* term to build and *when*; a [`DataFactory`]
//! builds it. One factory instance belongs to exactly one conversion, so its
//! blank node counter never collides with another conversion's.

use super::error::{JsonLdError, JsonLdResult};
use crate::rdf::{BlankNode, GraphName, Literal, NamedNode, Quad, RdfObject, RdfPredicate, RdfSubject};
use std::collections::HashMap;

/// Capability surface the converter needs for building terms
pub trait DataFactory: Send {
    /// An IRI term
    fn named_node(&mut self, iri: &str) -> JsonLdResult<NamedNode>;

    /// A blank node never handed out before in this conversion
    fn blank_node(&mut self) -> JsonLdResult<BlankNode>;

    /// The blank node for a document label (`_:label`); stable per label
    fn labeled_blank_node(&mut self, label: &str) -> JsonLdResult<BlankNode>;

    /// A literal; `datatype` and `language` are mutually exclusive
    fn literal(
        &mut self,
        lexical: &str,
        datatype: Option<NamedNode>,
        language: Option<&str>,
    ) -> JsonLdResult<Literal> {
        match (datatype, language) {
            (Some(_), Some(_)) => Err(JsonLdError::UnsupportedValue(
                "a literal cannot carry both a datatype and a language".to_string(),
            )),
            (None, Some(language)) => Ok(Literal::new_language_tagged_literal(lexical, language)?),
            (Some(datatype), None) => Ok(Literal::new_typed_literal(lexical, datatype)),
            (None, None) => Ok(Literal::new_simple_literal(lexical)),
        }
    }

    /// The default graph marker
    fn default_graph(&self) -> GraphName {
        GraphName::DefaultGraph
    }

    /// Assemble a statement
    fn quad(
        &self,
        subject: RdfSubject,
        predicate: RdfPredicate,
        object: RdfObject,
        graph: GraphName,
    ) -> Quad {
        Quad::new(subject, predicate, object, graph)
    }
}

/// Counter-based factory: blank nodes are `<prefix>0`, `<prefix>1`, ...
#[derive(Debug)]
pub struct DefaultDataFactory {
    prefix: String,
    next_id: u64,
    labels: HashMap<String, BlankNode>,
    validate_iris: bool,
}

impl DefaultDataFactory {
    /// Create a factory; fails if `prefix` cannot start a blank node label
    pub fn new(prefix: impl Into<String>, validate_iris: bool) -> JsonLdResult<Self> {
        let prefix = prefix.into();
        BlankNode::new(&format!("{}0", prefix)).map_err(|e| {
            JsonLdError::Config(format!("invalid blank node prefix {:?}: {}", prefix, e))
        })?;
        Ok(Self {
            prefix,
            next_id: 0,
            labels: HashMap::new(),
            validate_iris,
        })
    }

    /// Number of blank nodes allocated so far
    pub fn allocated(&self) -> u64 {
        self.next_id
    }
}

impl Default for DefaultDataFactory {
    fn default() -> Self {
        Self {
            prefix: "b".to_string(),
            next_id: 0,
            labels: HashMap::new(),
            validate_iris: true,
        }
    }
}

impl DataFactory for DefaultDataFactory {
    fn named_node(&mut self, iri: &str) -> JsonLdResult<NamedNode> {
        if self.validate_iris {
            Ok(NamedNode::new(iri)?)
        } else {
            Ok(NamedNode::new_unchecked(iri))
        }
    }

    fn blank_node(&mut self) -> JsonLdResult<BlankNode> {
        let node = BlankNode::new(&format!("{}{}", self.prefix, self.next_id))?;
        self.next_id += 1;
        Ok(node)
    }

    fn labeled_blank_node(&mut self, label: &str) -> JsonLdResult<BlankNode> {
        if let Some(node) = self.labels.get(label) {
            return Ok(node.clone());
        }
        let node = self.blank_node()?;
        self.labels.insert(label.to_string(), node.clone());
        Ok(node)
    }
}
