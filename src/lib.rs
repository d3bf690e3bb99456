//! Streaming JSON-LD to RDF quads
//!
//! Converts JSON-LD documents into RDF quads while the document is still
//! being read, without building a JSON tree first.
//!
//! # Architecture
//!
//! - [`rdf`]: the output data model (terms, quads, namespace prefixes)
//! - [`jsonld`]: tokenizer, statement engine, node context stack and sinks
//!
//! Keys may appear in any order: statements made before a node's `@id`
//! (or before the `@id` of the node naming their graph) wait until that
//! identity is known, then come out exactly once.
//!
//! ## Example Usage
//!
//! ```rust
//! use jsonld_streaming::{JsonLdParser, ParserOptions};
//!
//! let options = ParserOptions::default().with_prefix("ex", "http://example.org/");
//! let parser = JsonLdParser::new(options).unwrap();
//!
//! let quads = parser
//!     .parse_str(r#"{
//!         "@id": "ex:graph",
//!         "@graph": {"@id": "ex:alice", "ex:knows": {"@id": "ex:bob"}}
//!     }"#)
//!     .unwrap();
//!
//! assert_eq!(quads.len(), 1);
//! assert_eq!(
//!     quads[0].to_string(),
//!     "<http://example.org/alice> <http://example.org/knows> <http://example.org/bob> <http://example.org/graph> ."
//! );
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod jsonld;
pub mod rdf;

// Re-export main types for convenience
pub use jsonld::{
    parse_async, quad_stream, DataFactory, DefaultDataFactory, FnSink, JsonLdError,
    JsonLdParser, JsonLdResult, KeyResolver, NamespaceResolver, ParserOptions, QuadSink,
};

pub use rdf::{
    BlankNode, GraphName, Literal, NamedNode, NamespaceManager, Quad, RdfObject, RdfPredicate,
    RdfSubject,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}
