//! Conversion errors

use crate::rdf::RdfError;
use std::io;
use thiserror::Error;

/// Errors raised while turning JSON-LD into quads
///
/// Every variant except the ones returned from
/// [`JsonLdParser::value_to_term`](super::JsonLdParser::value_to_term) is
/// terminal for the conversion that produced it.
#[derive(Error, Debug)]
pub enum JsonLdError {
    /// Malformed JSON at the tokenizer boundary
    #[error("Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        message: String,
        line: usize,
        column: usize,
    },

    /// A second `@id` in one node object
    #[error("Duplicate @id: node already identified as {existing}, found {duplicate}")]
    DuplicateIdentity { existing: String, duplicate: String },

    /// A value shape that cannot be mapped to a term
    #[error("Unsupported value: {0}")]
    UnsupportedValue(String),

    /// A string that should be an IRI is not one
    #[error("Invalid IRI: {0}")]
    InvalidIri(String),

    /// Internal bookkeeping went wrong
    #[error("Invalid converter state: {0}")]
    InvalidState(String),

    /// The conversion already failed and accepts no more input
    #[error("Conversion aborted by an earlier error")]
    Aborted,

    /// The quad consumer went away before the input was exhausted
    #[error("Conversion cancelled: quad receiver dropped")]
    Cancelled,

    /// Option loading failed
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type JsonLdResult<T> = Result<T, JsonLdError>;

impl JsonLdError {
    /// Build a syntax error at a 1-based position
    pub fn syntax(message: impl Into<String>, line: usize, column: usize) -> Self {
        JsonLdError::Syntax {
            message: message.into(),
            line,
            column,
        }
    }
}

impl From<RdfError> for JsonLdError {
    fn from(err: RdfError) -> Self {
        match err {
            RdfError::InvalidIri(iri) => JsonLdError::InvalidIri(iri),
            RdfError::InvalidBlankNode(msg) => JsonLdError::UnsupportedValue(format!("blank node {}", msg)),
            RdfError::InvalidLiteral(msg) => JsonLdError::UnsupportedValue(format!("literal {}", msg)),
        }
    }
}
