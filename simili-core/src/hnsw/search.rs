//! Layer search routines for the HNSW graph.
//!
//! Implements the bounded best-first search run on every layer: a min-heap of
//! candidates drives exploration while a max-heap keeps the best `ef` results
//! seen so far. Ties on distance are broken by discovery order so repeated
//! searches over the same graph always return the same sequence.

use std::{
    cmp::Reverse,
    collections::{BinaryHeap, HashSet},
};

use crate::{
    distance::cosine_distance,
    hnsw::{
        error::HnswError,
        graph::{ExtendedSearchContext, Graph, SearchContext},
        types::{Neighbour, NodeId, RankedNeighbour},
    },
};

#[derive(Debug)]
struct SearchState {
    visited: HashSet<NodeId>,
    candidates: BinaryHeap<Reverse<RankedNeighbour>>,
    results: BinaryHeap<RankedNeighbour>,
    sequence: u64,
}

impl SearchState {
    fn new(entry: NodeId, distance: f32) -> Self {
        let mut visited = HashSet::new();
        visited.insert(entry);

        let mut candidates = BinaryHeap::new();
        candidates.push(Reverse(RankedNeighbour::new(entry, distance, 0)));

        Self {
            visited,
            candidates,
            results: BinaryHeap::new(),
            sequence: 1,
        }
    }

    fn pop_candidate(&mut self) -> Option<RankedNeighbour> {
        self.candidates.pop().map(|Reverse(candidate)| candidate)
    }

    /// Largest admitted distance, or infinity while fewer than `ef` results
    /// are held.
    fn worst(&self, ef: usize) -> f32 {
        if self.results.len() < ef {
            return f32::INFINITY;
        }
        self.results
            .peek()
            .map_or(f32::INFINITY, RankedNeighbour::distance)
    }

    fn should_terminate(&self, ef: usize, candidate_distance: f32) -> bool {
        self.results.len() >= ef && candidate_distance > self.worst(ef)
    }

    fn admit(&mut self, candidate: RankedNeighbour, ef: usize) {
        self.results.push(candidate);
        while self.results.len() > ef {
            self.results.pop();
        }
    }

    fn visit(&mut self, node: NodeId) -> bool {
        self.visited.insert(node)
    }

    fn try_enqueue(&mut self, node: NodeId, distance: f32, ef: usize) {
        if self.candidates.len() < ef || distance < self.worst(ef) {
            let ranked = RankedNeighbour::new(node, distance, self.sequence);
            self.sequence += 1;
            self.candidates.push(Reverse(ranked));
        }
    }

    fn finalise(self) -> Vec<Neighbour> {
        self.results
            .into_sorted_vec()
            .into_iter()
            .map(RankedNeighbour::into_neighbour)
            .collect()
    }
}

#[derive(Debug)]
pub(crate) struct LayerSearcher<'graph> {
    graph: &'graph Graph,
}

impl<'graph> LayerSearcher<'graph> {
    pub(crate) const fn new(graph: &'graph Graph) -> Self {
        Self { graph }
    }

    /// Returns up to `ef` neighbours of the query on one layer, closest first.
    ///
    /// Nodes without a list for the requested layer contribute no neighbours.
    pub(crate) fn search_layer(
        &self,
        ctx: ExtendedSearchContext<'_>,
    ) -> Result<Vec<Neighbour>, HnswError> {
        let ef = ctx.ef();
        let entry = self
            .graph
            .node(ctx.entry())
            .ok_or(HnswError::UnknownNode { node: ctx.entry() })?;
        let entry_distance = cosine_distance(ctx.query(), entry.vector())?;

        let mut state = SearchState::new(ctx.entry(), entry_distance);

        while let Some(candidate) = state.pop_candidate() {
            if state.should_terminate(ef, candidate.distance()) {
                break;
            }
            state.admit(candidate, ef);

            let Some(node) = self.graph.node(candidate.id()) else {
                return Err(HnswError::GraphInvariantViolation {
                    message: format!(
                        "node {} missing during layer search at level {}",
                        candidate.id(),
                        ctx.level()
                    ),
                });
            };

            for &neighbour in node.neighbours(ctx.level()) {
                if !state.visit(neighbour) {
                    continue;
                }
                let Some(target) = self.graph.node(neighbour) else {
                    return Err(HnswError::GraphInvariantViolation {
                        message: format!(
                            "node {} references missing neighbour {neighbour} at level {}",
                            candidate.id(),
                            ctx.level()
                        ),
                    });
                };
                let distance = cosine_distance(ctx.query(), target.vector())?;
                state.try_enqueue(neighbour, distance, ef);
            }
        }
        Ok(state.finalise())
    }

    /// Runs an `ef = 1` search on each layer from `from` down to `to`
    /// (inclusive), returning the closest node found on the last layer.
    pub(crate) fn descend(
        &self,
        query: &[f32],
        entry: NodeId,
        from: usize,
        to: usize,
    ) -> Result<NodeId, HnswError> {
        let mut current = entry;
        for level in (to..=from).rev() {
            let found = self.search_layer(
                SearchContext {
                    query,
                    entry: current,
                    level,
                }
                .with_ef(1),
            )?;
            if let Some(best) = found.first() {
                current = best.id;
            }
        }
        Ok(current)
    }
}
