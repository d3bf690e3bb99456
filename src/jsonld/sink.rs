//! Quad sinks
//!
//! Emission is append-only: a quad handed to a sink is never retracted, even
//! if the conversion fails later.

use super::error::JsonLdResult;
use crate::rdf::Quad;
use std::collections::VecDeque;

/// Receives fully resolved quads in emission order
pub trait QuadSink {
    fn push_quad(&mut self, quad: Quad) -> JsonLdResult<()>;
}

impl QuadSink for Vec<Quad> {
    fn push_quad(&mut self, quad: Quad) -> JsonLdResult<()> {
        self.push(quad);
        Ok(())
    }
}

impl QuadSink for VecDeque<Quad> {
    fn push_quad(&mut self, quad: Quad) -> JsonLdResult<()> {
        self.push_back(quad);
        Ok(())
    }
}

/// Adapts a closure into a sink
pub struct FnSink<F>(pub F);

impl<F: FnMut(Quad)> QuadSink for FnSink<F> {
    fn push_quad(&mut self, quad: Quad) -> JsonLdResult<()> {
        (self.0)(quad);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rdf::{GraphName, Literal, NamedNode, RdfPredicate};

    fn sample() -> Quad {
        Quad::new(
            NamedNode::new("http://ex.org/s").unwrap().into(),
            RdfPredicate::new("http://ex.org/p").unwrap(),
            Literal::new_simple_literal("o").into(),
            GraphName::DefaultGraph,
        )
    }

    #[test]
    fn test_vec_sinks() {
        let mut vec: Vec<Quad> = Vec::new();
        vec.push_quad(sample()).unwrap();
        assert_eq!(vec.len(), 1);

        let mut deque: VecDeque<Quad> = VecDeque::new();
        deque.push_quad(sample()).unwrap();
        assert_eq!(deque.pop_front(), Some(sample()));
    }

    #[test]
    fn test_fn_sink() {
        let mut count = 0;
        {
            let mut sink = FnSink(|_quad: Quad| count += 1);
            sink.push_quad(sample()).unwrap();
            sink.push_quad(sample()).unwrap();
        }
        assert_eq!(count, 2);
    }
}
