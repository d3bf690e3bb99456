//! Streaming JSON-LD parser
//!
//! [`JsonLdParser`] accepts the document in arbitrary chunks and pushes
//! quads into a [`QuadSink`] as soon as they are fully resolved.

use super::engine::StatementEngine;
use super::error::{JsonLdError, JsonLdResult};
use super::factory::{DataFactory, DefaultDataFactory};
use super::options::ParserOptions;
use super::resolver::{KeyResolver, NamespaceResolver};
use super::sink::QuadSink;
use super::tokenizer::JsonTokenizer;
use crate::rdf::{Quad, RdfObject};
use serde_json::Value;
use std::collections::VecDeque;
use std::io::{ErrorKind, Read};
use tracing::warn;

/// One JSON-LD to quads conversion
///
/// A parser handles exactly one document. After a terminal error, or after
/// [`finish`](Self::finish), it rejects further input with
/// [`JsonLdError::Aborted`].
pub struct JsonLdParser {
    tokenizer: JsonTokenizer,
    engine: StatementEngine,
    options: ParserOptions,
    poisoned: bool,
}

impl JsonLdParser {
    /// Create a parser; fails on an unusable blank node prefix
    pub fn new(options: ParserOptions) -> JsonLdResult<Self> {
        let factory = DefaultDataFactory::new(&options.blank_node_prefix, options.validate_iris)?;
        let resolver = NamespaceResolver::with_prefixes(&options.prefixes)
            .keep_plain_terms(!options.validate_iris);
        Ok(Self {
            tokenizer: JsonTokenizer::new(options.allow_trailing_commas, options.max_depth),
            engine: StatementEngine::new(Box::new(factory), Box::new(resolver)),
            options,
            poisoned: false,
        })
    }

    /// Replace the term factory
    pub fn with_factory(mut self, factory: Box<dyn DataFactory>) -> Self {
        self.engine.set_factory(factory);
        self
    }

    /// Replace the key resolver
    pub fn with_resolver(mut self, resolver: Box<dyn KeyResolver>) -> Self {
        self.engine.set_resolver(resolver);
        self
    }

    pub fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// True once a full top-level value was converted
    pub fn is_complete(&self) -> bool {
        self.engine.is_complete()
    }

    /// Feed the next chunk of input
    pub fn push(&mut self, chunk: &[u8], sink: &mut dyn QuadSink) -> JsonLdResult<()> {
        if self.poisoned {
            return Err(JsonLdError::Aborted);
        }
        self.tokenizer.feed(chunk);
        self.drain(sink).map_err(|e| self.poison(e))
    }

    /// Signal end of input and emit everything still pending
    pub fn finish(&mut self, sink: &mut dyn QuadSink) -> JsonLdResult<()> {
        if self.poisoned {
            return Err(JsonLdError::Aborted);
        }
        self.tokenizer.finish();
        let result = self.drain(sink).and_then(|_| self.engine.finish());
        self.poisoned = true;
        result.map_err(|e| self.poison(e))
    }

    /// Convert a complete document
    ///
    /// All or nothing: on error no quads are returned, even those that a
    /// streaming consumer would already have received.
    pub fn parse_slice(mut self, input: &[u8]) -> JsonLdResult<Vec<Quad>> {
        let mut quads = Vec::new();
        self.push(input, &mut quads)?;
        self.finish(&mut quads)?;
        Ok(quads)
    }

    /// Convert a complete document held in a string
    pub fn parse_str(self, input: &str) -> JsonLdResult<Vec<Quad>> {
        self.parse_slice(input.as_bytes())
    }

    /// Pull quads from a blocking reader
    pub fn parse_reader<R: Read>(self, reader: R) -> ReaderQuads<R> {
        let buffer = vec![0; self.options.read_buffer_size.max(1)];
        ReaderQuads {
            parser: self,
            reader,
            buffer,
            queue: VecDeque::new(),
            error: None,
            done: false,
        }
    }

    /// Convert one standalone JSON value to a term
    ///
    /// Errors are returned to the caller and leave the parser usable.
    pub fn value_to_term(&mut self, value: &Value) -> JsonLdResult<Option<RdfObject>> {
        self.engine.value_to_term(value)
    }

    fn drain(&mut self, sink: &mut dyn QuadSink) -> JsonLdResult<()> {
        while let Some(event) = self.tokenizer.next_event()? {
            self.engine.handle(event, sink)?;
        }
        Ok(())
    }

    fn poison(&mut self, error: JsonLdError) -> JsonLdError {
        if !matches!(error, JsonLdError::Aborted) {
            let (line, column) = self.tokenizer.position();
            warn!(line, column, error = %error, "JSON-LD conversion failed");
        }
        self.poisoned = true;
        error
    }
}

impl Default for JsonLdParser {
    fn default() -> Self {
        let options = ParserOptions::default();
        Self {
            tokenizer: JsonTokenizer::new(options.allow_trailing_commas, options.max_depth),
            engine: StatementEngine::new(
                Box::new(DefaultDataFactory::default()),
                Box::new(NamespaceResolver::new()),
            ),
            options,
            poisoned: false,
        }
    }
}

/// Iterator over the quads of a document read from a [`Read`]
///
/// Quads emitted before a failure are yielded first, then the error, then
/// the iterator ends.
pub struct ReaderQuads<R> {
    parser: JsonLdParser,
    reader: R,
    buffer: Vec<u8>,
    queue: VecDeque<Quad>,
    error: Option<JsonLdError>,
    done: bool,
}

impl<R: Read> ReaderQuads<R> {
    fn fill(&mut self) {
        loop {
            let result = match self.reader.read(&mut self.buffer) {
                Ok(0) => {
                    self.done = true;
                    self.parser.finish(&mut self.queue)
                }
                Ok(n) => self.parser.push(&self.buffer[..n], &mut self.queue),
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => Err(e.into()),
            };
            if let Err(e) = result {
                self.error = Some(e);
                self.done = true;
            }
            return;
        }
    }
}

impl<R: Read> Iterator for ReaderQuads<R> {
    type Item = JsonLdResult<Quad>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(quad) = self.queue.pop_front() {
                return Some(Ok(quad));
            }
            if let Some(error) = self.error.take() {
                return Some(Err(error));
            }
            if self.done {
                return None;
            }
            self.fill();
        }
    }
}
