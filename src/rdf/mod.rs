//! RDF data model used as conversion output
//!
//! This module provides:
//! - RDF terms (named nodes, blank nodes, literals)
//! - Quads with a graph label (named, blank, or the default graph)
//! - Namespace prefixes for compact IRIs and the built-in vocabulary IRIs
//!
//! # Example
//!
//! ```rust
//! use jsonld_streaming::rdf::{GraphName, Literal, NamedNode, Quad, RdfPredicate};
//!
//! let subject = NamedNode::new("http://example.org/alice").unwrap();
//! let predicate = RdfPredicate::new("http://xmlns.com/foaf/0.1/name").unwrap();
//! let object = Literal::new_simple_literal("Alice");
//!
//! let quad = Quad::new(subject.into(), predicate, object.into(), GraphName::DefaultGraph);
//! assert_eq!(
//!     quad.to_string(),
//!     "<http://example.org/alice> <http://xmlns.com/foaf/0.1/name> \"Alice\" ."
//! );
//! ```

mod namespace;
mod types;

pub use types::{
    BlankNode, GraphName, Literal, NamedNode, Quad, RdfError, RdfObject, RdfPredicate,
    RdfResult, RdfSubject,
};

pub use namespace::{rdf, xsd, NamespaceManager, PrefixError, PrefixResult};
