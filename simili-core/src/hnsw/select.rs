//! Diversity-aware neighbour selection.
//!
//! The first pass keeps a candidate only when it is strictly closer to the
//! query than to every neighbour accepted so far, which approximates a
//! relative neighbourhood graph and spreads links across directions. The
//! second pass tops the selection up with the closest remaining candidates.

use std::collections::HashSet;

use crate::{
    distance::cosine_distance,
    hnsw::{
        error::HnswError,
        graph::Graph,
        node::Node,
        types::{Neighbour, NodeId},
    },
};

#[derive(Debug)]
pub(crate) struct NeighbourSelector<'graph> {
    graph: &'graph Graph,
}

impl<'graph> NeighbourSelector<'graph> {
    pub(crate) const fn new(graph: &'graph Graph) -> Self {
        Self { graph }
    }

    /// Scores `candidates` against `query` and selects at most `max_count`.
    ///
    /// Repeated identifiers are considered once.
    pub(crate) fn select(
        &self,
        query: &[f32],
        candidates: &[NodeId],
        max_count: usize,
    ) -> Result<Vec<NodeId>, HnswError> {
        let mut seen = HashSet::with_capacity(candidates.len());
        let mut scored = Vec::with_capacity(candidates.len());
        for &id in candidates {
            if !seen.insert(id) {
                continue;
            }
            let distance = cosine_distance(query, self.vector(id)?)?;
            scored.push(Neighbour { id, distance });
        }
        self.select_scored(scored, max_count)
    }

    /// Selects from candidates whose query distances are already known.
    ///
    /// Candidates are ordered by distance with the incoming order kept for
    /// ties. Diverse picks come first, followed by the fill-ins, each group in
    /// distance order.
    pub(crate) fn select_scored(
        &self,
        mut candidates: Vec<Neighbour>,
        max_count: usize,
    ) -> Result<Vec<NodeId>, HnswError> {
        if max_count == 0 || candidates.is_empty() {
            return Ok(Vec::new());
        }
        candidates.sort_by(|a, b| a.distance.total_cmp(&b.distance));

        let mut accepted: Vec<NodeId> = Vec::with_capacity(max_count);
        for candidate in &candidates {
            if accepted.len() >= max_count {
                break;
            }
            if !accepted.contains(&candidate.id) && self.is_diverse(candidate, &accepted)? {
                accepted.push(candidate.id);
            }
        }

        for candidate in &candidates {
            if accepted.len() >= max_count {
                break;
            }
            if !accepted.contains(&candidate.id) {
                accepted.push(candidate.id);
            }
        }

        Ok(accepted)
    }

    fn is_diverse(&self, candidate: &Neighbour, accepted: &[NodeId]) -> Result<bool, HnswError> {
        let vector = self.vector(candidate.id)?;
        for &existing in accepted {
            let separation = cosine_distance(vector, self.vector(existing)?)?;
            if candidate.distance >= separation {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn vector(&self, id: NodeId) -> Result<&'graph [f32], HnswError> {
        self.graph
            .node(id)
            .map(Node::vector)
            .ok_or(HnswError::UnknownNode { node: id })
    }
}
