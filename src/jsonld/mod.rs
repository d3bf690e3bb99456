//! Streaming JSON-LD to RDF conversion
//!
//! The pipeline, from bytes to quads:
//! - [`JsonTokenizer`]: incremental JSON events from arbitrary chunks
//! - the statement engine: keys and values mapped to statements
//! - the node stack: statements held until their subject and graph are known
//! - a [`QuadSink`]: receives each quad once, in emission order
//!
//! An `@id` may arrive after statements that depend on it. Those statements
//! wait, and are emitted the moment the identity is known or the node closes
//! (anonymous nodes get a fresh blank node).
//!
//! # Example
//!
//! ```rust
//! use jsonld_streaming::jsonld::JsonLdParser;
//!
//! let quads = JsonLdParser::default()
//!     .parse_str(r#"{"http://ex.org/name": "Alice", "@id": "http://ex.org/alice"}"#)
//!     .unwrap();
//! assert_eq!(
//!     quads[0].to_string(),
//!     r#"<http://ex.org/alice> <http://ex.org/name> "Alice" ."#
//! );
//! ```

mod engine;
mod error;
mod event;
mod factory;
mod options;
mod parser;
mod resolver;
mod sink;
mod stack;
mod stream;
mod term;
mod tokenizer;

pub use error::{JsonLdError, JsonLdResult};
pub use event::{JsonEvent, Scalar};
pub use factory::{DataFactory, DefaultDataFactory};
pub use options::ParserOptions;
pub use parser::{JsonLdParser, ReaderQuads};
pub use resolver::{KeyResolver, Keyword, NamespaceResolver};
pub use sink::{FnSink, QuadSink};
pub use stream::{parse_async, parse_async_with, quad_stream};
pub use term::{number_lexical, scalar_to_term, value_to_term, ValueObject};
pub use tokenizer::JsonTokenizer;
