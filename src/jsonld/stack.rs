//! Node context stack and statement resolution
//!
//! Every open node object owns one [`NodeContext`], addressed by its depth
//! (root = 0). A statement mentions its subject and graph as [`Slot`]s: either
//! a term already known, or the future identity of the context at some depth.
//! Statements whose slots are all known are emitted at once; the rest wait in
//! the pending queue of the deepest context they depend on, and are re-routed
//! when that context resolves.
//!
//! Queued statements only ever reference contexts at or above the one holding
//! them, so every reference points at a live stack entry.

use super::error::{JsonLdError, JsonLdResult};
use super::factory::DataFactory;
use super::sink::QuadSink;
use crate::rdf::{GraphName, RdfObject, RdfPredicate, RdfSubject};
use std::fmt;
use tracing::{debug, trace};

/// What a node context resolved to
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum NodeIdentity {
    Subject(RdfSubject),
    /// A root that describes nothing itself stands for the default graph
    DefaultGraph,
}

impl NodeIdentity {
    fn as_graph(&self, factory: &dyn DataFactory) -> GraphName {
        match self {
            NodeIdentity::Subject(subject) => subject.clone().into(),
            NodeIdentity::DefaultGraph => factory.default_graph(),
        }
    }

    fn to_subject(&self) -> JsonLdResult<RdfSubject> {
        match self {
            NodeIdentity::Subject(subject) => Ok(subject.clone()),
            NodeIdentity::DefaultGraph => Err(JsonLdError::InvalidState(
                "the default graph cannot be used as a subject".to_string(),
            )),
        }
    }
}

impl fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeIdentity::Subject(subject) => write!(f, "{}", subject),
            NodeIdentity::DefaultGraph => write!(f, "the default graph"),
        }
    }
}

#[derive(Debug, Clone)]
enum Slot {
    Known(NodeIdentity),
    /// Identity of the context at this depth, once resolved
    Awaiting(usize),
}

#[derive(Debug)]
struct PendingStatement {
    subject: Slot,
    predicate: RdfPredicate,
    object: RdfObject,
    graph: Slot,
}

/// Edge from a parent node to a child object, stated when the child closes
#[derive(Debug)]
struct Link {
    parent: usize,
    predicate: RdfPredicate,
}

/// Per-node-object resolution state
#[derive(Debug)]
pub(crate) struct NodeContext {
    identity: Option<NodeIdentity>,
    graph: Slot,
    pending: Vec<PendingStatement>,
    is_root: bool,
    has_statements: bool,
    link: Option<Link>,
}

impl NodeContext {
    fn new(graph: Slot, is_root: bool, link: Option<Link>) -> Self {
        Self {
            identity: None,
            graph,
            pending: Vec::new(),
            is_root,
            has_statements: false,
            link,
        }
    }
}

/// Stack of open node contexts for one conversion
#[derive(Debug, Default)]
pub(crate) struct NodeStack {
    contexts: Vec<NodeContext>,
}

impl NodeStack {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of open contexts
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Identity of the context at `depth`, if resolved
    pub fn identity(&self, depth: usize) -> Option<&NodeIdentity> {
        self.contexts.get(depth).and_then(|ctx| ctx.identity.as_ref())
    }

    /// Statements queued on the context at `depth`
    #[cfg(test)]
    pub fn pending_len(&self, depth: usize) -> usize {
        self.contexts.get(depth).map_or(0, |ctx| ctx.pending.len())
    }

    /// Open a top-level node; its statements go to the default graph
    pub fn open_root(&mut self) -> JsonLdResult<usize> {
        if !self.contexts.is_empty() {
            return Err(JsonLdError::InvalidState(
                "root node opened inside another node".to_string(),
            ));
        }
        self.contexts.push(NodeContext::new(
            Slot::Known(NodeIdentity::DefaultGraph),
            true,
            None,
        ));
        Ok(0)
    }

    /// Open a node that is the object of `predicate` on the node at `parent`
    pub fn open_object(&mut self, parent: usize, predicate: RdfPredicate) -> JsonLdResult<usize> {
        let graph = self.context_mut(parent)?.graph.clone();
        self.push_child(parent, NodeContext::new(graph, false, Some(Link { parent, predicate })))
    }

    /// Open a node listed under `@graph` of the node at `parent`
    ///
    /// The node's statements are labeled with the parent's identity, which
    /// may not be known yet.
    pub fn open_graph_member(&mut self, parent: usize) -> JsonLdResult<usize> {
        let graph = self.settle(Slot::Awaiting(parent));
        self.context_mut(parent)?;
        self.push_child(parent, NodeContext::new(graph, false, None))
    }

    fn push_child(&mut self, parent: usize, ctx: NodeContext) -> JsonLdResult<usize> {
        if parent + 1 != self.contexts.len() {
            return Err(JsonLdError::InvalidState(format!(
                "child opened under depth {} while {} contexts are open",
                parent,
                self.contexts.len()
            )));
        }
        self.contexts.push(ctx);
        Ok(parent + 1)
    }

    /// Resolve the context at `depth` to an explicit identity
    pub fn set_identity(
        &mut self,
        depth: usize,
        subject: RdfSubject,
        factory: &mut dyn DataFactory,
        sink: &mut dyn QuadSink,
    ) -> JsonLdResult<()> {
        let ctx = self.context_mut(depth)?;
        if let Some(existing) = &ctx.identity {
            return Err(JsonLdError::DuplicateIdentity {
                existing: existing.to_string(),
                duplicate: subject.to_string(),
            });
        }
        debug!(depth, subject = %subject, "node identified");
        ctx.identity = Some(NodeIdentity::Subject(subject));
        self.flush(depth, factory, sink)
    }

    /// State `predicate object` about the node at `depth`
    pub fn add_statement(
        &mut self,
        depth: usize,
        predicate: RdfPredicate,
        object: RdfObject,
        factory: &mut dyn DataFactory,
        sink: &mut dyn QuadSink,
    ) -> JsonLdResult<()> {
        let ctx = self.context_mut(depth)?;
        ctx.has_statements = true;
        let statement = PendingStatement {
            subject: Slot::Awaiting(depth),
            predicate,
            object,
            graph: ctx.graph.clone(),
        };
        self.route(statement, factory, sink)
    }

    /// Close the innermost context
    ///
    /// An unresolved context becomes a fresh blank node, except a root that
    /// stated nothing, which becomes the default graph. The link to the
    /// parent is routed before the context's own queue is drained.
    pub fn close(
        &mut self,
        factory: &mut dyn DataFactory,
        sink: &mut dyn QuadSink,
    ) -> JsonLdResult<NodeIdentity> {
        let depth = self
            .contexts
            .len()
            .checked_sub(1)
            .ok_or_else(|| JsonLdError::InvalidState("close on an empty stack".to_string()))?;

        let identity = match self.contexts[depth].identity.clone() {
            Some(identity) => identity,
            None => {
                let ctx = &mut self.contexts[depth];
                let identity = if ctx.is_root && !ctx.has_statements {
                    NodeIdentity::DefaultGraph
                } else {
                    NodeIdentity::Subject(factory.blank_node()?.into())
                };
                trace!(depth, identity = %identity, "node resolved on close");
                ctx.identity = Some(identity.clone());
                identity
            }
        };

        if let Some(link) = self.contexts[depth].link.take() {
            let parent = self.context_mut(link.parent)?;
            parent.has_statements = true;
            let graph = parent.graph.clone();
            let statement = PendingStatement {
                subject: Slot::Awaiting(link.parent),
                predicate: link.predicate,
                object: identity.to_subject()?.into(),
                graph,
            };
            self.route(statement, factory, sink)?;
        }

        self.flush(depth, factory, sink)?;
        self.contexts.pop();
        Ok(identity)
    }

    /// Drop the innermost context without resolving it
    ///
    /// Used when an object under a predicate turns out to be a value object.
    /// Returns the parent depth and predicate the object hung from.
    pub fn discard(&mut self) -> JsonLdResult<(usize, RdfPredicate)> {
        let ctx = self
            .contexts
            .pop()
            .ok_or_else(|| JsonLdError::InvalidState("discard on an empty stack".to_string()))?;
        if !ctx.pending.is_empty() {
            return Err(JsonLdError::InvalidState(
                "discarded a context with queued statements".to_string(),
            ));
        }
        let link = ctx
            .link
            .ok_or_else(|| JsonLdError::InvalidState("discarded a context without parent".to_string()))?;
        Ok((link.parent, link.predicate))
    }

    fn context_mut(&mut self, depth: usize) -> JsonLdResult<&mut NodeContext> {
        self.contexts
            .get_mut(depth)
            .ok_or_else(|| JsonLdError::InvalidState(format!("no node context at depth {}", depth)))
    }

    fn settle(&self, slot: Slot) -> Slot {
        match slot {
            Slot::Awaiting(depth) => match self.identity(depth) {
                Some(identity) => Slot::Known(identity.clone()),
                None => Slot::Awaiting(depth),
            },
            known => known,
        }
    }

    fn route(
        &mut self,
        statement: PendingStatement,
        factory: &mut dyn DataFactory,
        sink: &mut dyn QuadSink,
    ) -> JsonLdResult<()> {
        let PendingStatement { subject, predicate, object, graph } = statement;
        let subject = self.settle(subject);
        let graph = self.settle(graph);
        let waiting_on = match (&subject, &graph) {
            (Slot::Known(s), Slot::Known(g)) => {
                let graph = g.as_graph(factory);
                let quad = factory.quad(s.to_subject()?, predicate, object, graph);
                return sink.push_quad(quad);
            }
            (Slot::Awaiting(a), Slot::Awaiting(b)) => (*a).max(*b),
            (Slot::Awaiting(d), Slot::Known(_)) | (Slot::Known(_), Slot::Awaiting(d)) => *d,
        };
        self.context_mut(waiting_on)?.pending.push(PendingStatement {
            subject,
            predicate,
            object,
            graph,
        });
        Ok(())
    }

    fn flush(
        &mut self,
        depth: usize,
        factory: &mut dyn DataFactory,
        sink: &mut dyn QuadSink,
    ) -> JsonLdResult<()> {
        let pending = std::mem::take(&mut self.context_mut(depth)?.pending);
        for statement in pending {
            self.route(statement, factory, sink)?;
        }
        Ok(())
    }
}
