//! Statement resolution engine
//!
//! Consumes [`JsonEvent`]s one at a time and turns them into stack
//! operations. The engine keeps one [`Frame`] per open JSON container and
//! remembers, between a key and its value, what that value is for.

use super::error::{JsonLdError, JsonLdResult};
use super::event::{JsonEvent, Scalar};
use super::factory::DataFactory;
use super::resolver::{KeyResolver, Keyword};
use super::sink::QuadSink;
use super::stack::NodeStack;
use super::term::{self, ValueObject};
use crate::rdf::{rdf, RdfObject, RdfPredicate, RdfSubject};
use serde_json::Value;
use tracing::{debug, trace};

/// Shape of an object, decided by its first distinguishing key
#[derive(Debug)]
enum NodeKind {
    /// Object under a predicate; `@type` values seen so far are held back
    Undetermined { types: Vec<String> },
    Node,
    Value(ValueObject),
}

#[derive(Debug)]
enum Frame {
    Node { depth: usize, kind: NodeKind },
    Array { target: Target },
    Skip { nesting: usize },
}

/// What the next value belongs to
#[derive(Debug, Clone)]
enum Target {
    Document,
    Predicate { depth: usize, predicate: RdfPredicate },
    Identity { depth: usize },
    Graph { depth: usize },
    NodeType { depth: usize },
    DeferredType { frame: usize },
    ValueMember { frame: usize, keyword: Keyword },
    Skip,
}

pub(crate) struct StatementEngine {
    stack: NodeStack,
    frames: Vec<Frame>,
    expect: Option<Target>,
    factory: Box<dyn DataFactory>,
    resolver: Box<dyn KeyResolver>,
    complete: bool,
}

impl StatementEngine {
    pub fn new(factory: Box<dyn DataFactory>, resolver: Box<dyn KeyResolver>) -> Self {
        Self {
            stack: NodeStack::new(),
            frames: Vec::new(),
            expect: None,
            factory,
            resolver,
            complete: false,
        }
    }

    pub fn set_factory(&mut self, factory: Box<dyn DataFactory>) {
        self.factory = factory;
    }

    pub fn set_resolver(&mut self, resolver: Box<dyn KeyResolver>) {
        self.resolver = resolver;
    }

    /// True once a complete top-level value was processed
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Convert a standalone JSON value with this conversion's factory
    pub fn value_to_term(&mut self, value: &Value) -> JsonLdResult<Option<RdfObject>> {
        term::value_to_term(value, self.factory.as_mut(), self.resolver.as_ref())
    }

    /// Process one event
    pub fn handle(&mut self, event: JsonEvent, sink: &mut dyn QuadSink) -> JsonLdResult<()> {
        trace!(event = %event.describe(), depth = self.stack.len(), "json event");

        if let Some(Frame::Skip { nesting }) = self.frames.last_mut() {
            match event {
                JsonEvent::ObjectBegin | JsonEvent::ArrayBegin => *nesting += 1,
                JsonEvent::ObjectEnd | JsonEvent::ArrayEnd => *nesting -= 1,
                JsonEvent::Key(_) | JsonEvent::Scalar(_) => {}
            }
            if *nesting == 0 {
                self.frames.pop();
            }
            return Ok(());
        }

        if let Some(target) = self.expect.take() {
            return self.handle_value(target, event, false, sink);
        }

        match self.frames.last() {
            None if self.complete => Err(JsonLdError::InvalidState(format!(
                "{} after the end of the document",
                event.describe()
            ))),
            None => self.handle_value(Target::Document, event, false, sink),
            Some(Frame::Array { target }) => {
                let target = target.clone();
                if event == JsonEvent::ArrayEnd {
                    self.frames.pop();
                    self.check_complete();
                    return Ok(());
                }
                self.handle_value(target, event, true, sink)
            }
            Some(Frame::Node { .. }) => match event {
                JsonEvent::Key(key) => self.handle_key(key, sink),
                JsonEvent::ObjectEnd => self.close_node(sink),
                other => Err(unexpected(&other)),
            },
            Some(Frame::Skip { .. }) => Ok(()),
        }
    }

    /// Check that the document ended cleanly
    pub fn finish(&self) -> JsonLdResult<()> {
        if !self.frames.is_empty() || !self.stack.is_empty() || self.expect.is_some() {
            return Err(JsonLdError::InvalidState(
                "input ended inside an open node".to_string(),
            ));
        }
        Ok(())
    }

    fn handle_value(
        &mut self,
        target: Target,
        event: JsonEvent,
        in_array: bool,
        sink: &mut dyn QuadSink,
    ) -> JsonLdResult<()> {
        if event == JsonEvent::ArrayBegin {
            if in_array {
                return Err(JsonLdError::UnsupportedValue(
                    "nested arrays are not supported".to_string(),
                ));
            }
            if !matches!(target, Target::Skip | Target::ValueMember { .. } | Target::Identity { .. }) {
                self.frames.push(Frame::Array { target });
                return Ok(());
            }
        }

        match target {
            Target::Skip => {
                if matches!(event, JsonEvent::ObjectBegin | JsonEvent::ArrayBegin) {
                    self.frames.push(Frame::Skip { nesting: 1 });
                }
            }
            Target::Document => match event {
                JsonEvent::ObjectBegin => {
                    let depth = self.stack.open_root()?;
                    self.frames.push(Frame::Node { depth, kind: NodeKind::Node });
                }
                JsonEvent::Scalar(scalar) => {
                    debug!(kind = scalar.type_name(), "ignoring free-floating top-level value");
                    if !in_array {
                        self.complete = true;
                    }
                }
                other => return Err(unexpected(&other)),
            },
            Target::Predicate { depth, predicate } => match event {
                JsonEvent::Scalar(scalar) => {
                    if let Some(object) = term::scalar_to_term(&scalar, self.factory.as_mut())? {
                        self.stack
                            .add_statement(depth, predicate, object, self.factory.as_mut(), sink)?;
                    }
                }
                JsonEvent::ObjectBegin => {
                    let child = self.stack.open_object(depth, predicate)?;
                    self.frames.push(Frame::Node {
                        depth: child,
                        kind: NodeKind::Undetermined { types: Vec::new() },
                    });
                }
                other => return Err(unexpected(&other)),
            },
            Target::Identity { depth } => match event {
                JsonEvent::Scalar(Scalar::String(id)) => {
                    let subject = self.subject_term(&id)?;
                    self.stack
                        .set_identity(depth, subject, self.factory.as_mut(), sink)?;
                }
                other => {
                    return Err(JsonLdError::UnsupportedValue(format!(
                        "@id must be a string, found {}",
                        other.describe()
                    )));
                }
            },
            Target::Graph { depth } => match event {
                JsonEvent::ObjectBegin => {
                    let member = self.stack.open_graph_member(depth)?;
                    self.frames.push(Frame::Node { depth: member, kind: NodeKind::Node });
                }
                JsonEvent::Scalar(Scalar::Null) => {}
                other => {
                    return Err(JsonLdError::UnsupportedValue(format!(
                        "@graph members must be node objects, found {}",
                        other.describe()
                    )));
                }
            },
            Target::NodeType { depth } => match event {
                JsonEvent::Scalar(Scalar::String(value)) => self.emit_type(depth, &value, sink)?,
                other => return Err(invalid_type(&other)),
            },
            Target::DeferredType { frame } => match event {
                JsonEvent::Scalar(Scalar::String(value)) => match self.frames.get_mut(frame) {
                    Some(Frame::Node { kind: NodeKind::Undetermined { types }, .. }) => types.push(value),
                    _ => {
                        return Err(JsonLdError::InvalidState(
                            "deferred @type without an undetermined object".to_string(),
                        ));
                    }
                },
                other => return Err(invalid_type(&other)),
            },
            Target::ValueMember { frame, keyword } => match event {
                JsonEvent::Scalar(scalar) => match self.frames.get_mut(frame) {
                    Some(Frame::Node { kind: NodeKind::Value(builder), .. }) => builder.set(keyword, scalar)?,
                    _ => {
                        return Err(JsonLdError::InvalidState(
                            "value member outside a value object".to_string(),
                        ));
                    }
                },
                _ => {
                    return Err(JsonLdError::UnsupportedValue(
                        "invalid value object: members must be scalars".to_string(),
                    ));
                }
            },
        }
        Ok(())
    }

    fn handle_key(&mut self, key: String, sink: &mut dyn QuadSink) -> JsonLdResult<()> {
        let frame = self.frames.len() - 1;
        let (depth, is_value, is_undetermined) = match &self.frames[frame] {
            Frame::Node { depth, kind } => (
                *depth,
                matches!(kind, NodeKind::Value(_)),
                matches!(kind, NodeKind::Undetermined { .. }),
            ),
            _ => return Err(JsonLdError::InvalidState(format!("key {:?} outside an object", key))),
        };

        let target = match Keyword::parse(&key) {
            None => {
                self.become_node(frame, sink)?;
                match self.resolver.expand(&key) {
                    Some(iri) => {
                        let predicate = RdfPredicate::from(self.factory.named_node(&iri)?);
                        Target::Predicate { depth, predicate }
                    }
                    None => {
                        debug!(key = %key, "dropping key that does not expand to an IRI");
                        Target::Skip
                    }
                }
            }
            Some(Keyword::Id) => {
                self.become_node(frame, sink)?;
                Target::Identity { depth }
            }
            Some(Keyword::Graph) => {
                self.become_node(frame, sink)?;
                Target::Graph { depth }
            }
            Some(Keyword::Type) if is_value => Target::ValueMember { frame, keyword: Keyword::Type },
            Some(Keyword::Type) if is_undetermined => Target::DeferredType { frame },
            Some(Keyword::Type) => Target::NodeType { depth },
            Some(keyword @ (Keyword::Value | Keyword::Language)) => {
                self.become_value(frame)?;
                Target::ValueMember { frame, keyword }
            }
            Some(Keyword::Context) | Some(Keyword::Other) => {
                debug!(key = %key, "skipping keyword");
                Target::Skip
            }
        };
        self.expect = Some(target);
        Ok(())
    }

    fn close_node(&mut self, sink: &mut dyn QuadSink) -> JsonLdResult<()> {
        let frame = self.frames.len() - 1;
        if matches!(
            self.frames[frame],
            Frame::Node { kind: NodeKind::Undetermined { .. }, .. }
        ) {
            self.become_node(frame, sink)?;
        }

        match self.frames.pop() {
            Some(Frame::Node { kind: NodeKind::Value(builder), .. }) => {
                let (parent, predicate) = self.stack.discard()?;
                let object = builder.finish(self.factory.as_mut(), self.resolver.as_ref())?;
                if let Some(object) = object {
                    self.stack
                        .add_statement(parent, predicate, object, self.factory.as_mut(), sink)?;
                }
            }
            Some(Frame::Node { .. }) => {
                self.stack.close(self.factory.as_mut(), sink)?;
            }
            _ => return Err(JsonLdError::InvalidState("'}' without an open object".to_string())),
        }
        self.check_complete();
        Ok(())
    }

    /// Commit an undetermined object to being a node, releasing held `@type`s
    fn become_node(&mut self, frame: usize, sink: &mut dyn QuadSink) -> JsonLdResult<()> {
        let (depth, types) = match self.frames.get_mut(frame) {
            Some(Frame::Node { depth, kind }) => match kind {
                NodeKind::Node => return Ok(()),
                NodeKind::Value(_) => {
                    return Err(JsonLdError::UnsupportedValue(
                        "invalid value object: only @value, @language and @type are allowed"
                            .to_string(),
                    ));
                }
                NodeKind::Undetermined { types } => {
                    let types = std::mem::take(types);
                    *kind = NodeKind::Node;
                    (*depth, types)
                }
            },
            _ => return Err(JsonLdError::InvalidState("no object to classify".to_string())),
        };
        for value in types {
            self.emit_type(depth, &value, sink)?;
        }
        Ok(())
    }

    fn become_value(&mut self, frame: usize) -> JsonLdResult<()> {
        match self.frames.get_mut(frame) {
            Some(Frame::Node { kind, .. }) => match kind {
                NodeKind::Value(_) => Ok(()),
                NodeKind::Node => Err(JsonLdError::UnsupportedValue(
                    "@value and @language are only allowed in value objects".to_string(),
                )),
                NodeKind::Undetermined { types } => {
                    let mut builder = ValueObject::default();
                    for value in types.drain(..) {
                        builder.set(Keyword::Type, Scalar::String(value))?;
                    }
                    *kind = NodeKind::Value(builder);
                    Ok(())
                }
            },
            _ => Err(JsonLdError::InvalidState("no object to classify".to_string())),
        }
    }

    fn emit_type(&mut self, depth: usize, value: &str, sink: &mut dyn QuadSink) -> JsonLdResult<()> {
        let object: RdfObject = self.subject_term(value)?.into();
        let predicate = RdfPredicate::from(self.factory.named_node(rdf::TYPE)?);
        self.stack
            .add_statement(depth, predicate, object, self.factory.as_mut(), sink)
    }

    /// `_:label` names a blank node; anything else must expand to an IRI
    fn subject_term(&mut self, value: &str) -> JsonLdResult<RdfSubject> {
        match value.strip_prefix("_:") {
            Some(label) => Ok(self.factory.labeled_blank_node(label)?.into()),
            None => Ok(term::iri_term(value, self.factory.as_mut(), self.resolver.as_ref())?.into()),
        }
    }

    fn check_complete(&mut self) {
        if self.frames.is_empty() {
            self.complete = true;
        }
    }
}

fn unexpected(event: &JsonEvent) -> JsonLdError {
    JsonLdError::InvalidState(format!("unexpected {}", event.describe()))
}

fn invalid_type(event: &JsonEvent) -> JsonLdError {
    JsonLdError::UnsupportedValue(format!("@type must be a string, found {}", event.describe()))
}
