//! Structural invariant checks for the HNSW graph.
//!
//! The checkers are surfaced via [`HnswIndex::invariants`] so tests can assert
//! graph health after each operation, and restored node maps are validated
//! with the same rules before an index accepts them.

mod adjacency;
mod degree_bounds;
mod dimensions;
mod entry_point;
mod helpers;
mod layer_consistency;

use std::fmt;

use thiserror::Error;

use crate::hnsw::{HnswIndex, graph::Graph, params::HnswParams};

use self::{
    adjacency::check_adjacency_hygiene, degree_bounds::check_degree_bounds,
    dimensions::check_dimensions, entry_point::check_entry_point,
    layer_consistency::check_layer_consistency,
};

/// Enumerates the structural invariants enforced by the HNSW graph.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum HnswInvariant {
    /// Every node holds one list per layer up to its level, and every
    /// referenced neighbour exists and reaches the referencing layer.
    LayerConsistency,
    /// No list holds more than `max_neighbours` entries.
    DegreeBounds,
    /// Lists contain neither self-loops nor repeated identifiers.
    AdjacencyHygiene,
    /// The entry point exists and sits on the highest layer.
    EntryPoint,
    /// Every vector matches the index dimensionality.
    DimensionConsistency,
}

impl HnswInvariant {
    /// Returns all invariants in the order they should be evaluated.
    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::LayerConsistency,
            Self::DegreeBounds,
            Self::AdjacencyHygiene,
            Self::EntryPoint,
            Self::DimensionConsistency,
        ]
    }
}

/// Reason describing why a layer-consistency check failed.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LayerConsistencyDetail {
    /// The referenced node does not exist.
    MissingNode,
    /// The referenced node exists but exposes fewer layers than required.
    MissingLayer {
        /// Number of lists the referenced node holds.
        available: usize,
    },
}

impl fmt::Display for LayerConsistencyDetail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingNode => f.write_str("target node is missing"),
            Self::MissingLayer { available } => {
                write!(f, "target node exposes only {available} level(s)")
            }
        }
    }
}

/// Reports an invariant violation surfaced by [`HnswInvariantChecker`].
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum HnswInvariantViolation {
    /// A node references a neighbour at a level the neighbour does not expose.
    #[error("node {origin} references {target} at layer {layer}, but {detail}")]
    LayerConsistency {
        /// Node that emitted the invalid reference.
        origin: usize,
        /// Referenced neighbour identifier.
        target: usize,
        /// Layer index of the reference.
        layer: usize,
        /// Detailed failure reason.
        detail: LayerConsistencyDetail,
    },
    /// A node's number of neighbour lists disagrees with its level.
    #[error("node {node} has level {level} but {lists} neighbour list(s)")]
    LevelMismatch {
        /// Offending node.
        node: usize,
        /// Declared level.
        level: usize,
        /// Number of lists held.
        lists: usize,
    },
    /// A node sits above the highest layer the parameters allow.
    #[error("node {node} has level {level}, above the cap of {max_level}")]
    LevelAboveCap {
        /// Offending node.
        node: usize,
        /// Declared level.
        level: usize,
        /// Highest level permitted by the parameters.
        max_level: usize,
    },
    /// A node exceeded the configured degree bound for a specific layer.
    #[error("node {node} has {degree} connection(s) on layer {layer}, exceeding limit {limit}")]
    DegreeBounds {
        /// Node whose adjacency exceeded the allowed bound.
        node: usize,
        /// Layer containing the overflow.
        layer: usize,
        /// Actual neighbouring nodes counted.
        degree: usize,
        /// Maximum permitted neighbours for the layer.
        limit: usize,
    },
    /// A node lists itself as a neighbour.
    #[error("node {node} links to itself on layer {layer}")]
    SelfLoop {
        /// Offending node.
        node: usize,
        /// Layer holding the self-reference.
        layer: usize,
    },
    /// A neighbour appears more than once in a single list.
    #[error("node {node} lists {neighbour} more than once on layer {layer}")]
    DuplicateNeighbour {
        /// Node owning the list.
        node: usize,
        /// Repeated neighbour identifier.
        neighbour: usize,
        /// Layer of the list.
        layer: usize,
    },
    /// Reported when a populated graph lacks an entry point.
    #[error("graph entry point missing despite populated nodes")]
    MissingEntryPoint,
    /// Reported when an empty graph still names an entry point.
    #[error("graph is empty but names entry point {node}")]
    UnexpectedEntryPoint {
        /// Stale entry point identifier.
        node: usize,
    },
    /// The entry point names a node that is not part of the graph.
    #[error("entry point {node} is not part of the graph")]
    DanglingEntryPoint {
        /// Identifier named by the entry point.
        node: usize,
    },
    /// The entry point does not sit on the highest layer.
    #[error("entry point {node} is on layer {entry_level}, but the highest layer is {max_level}")]
    EntryLevelMismatch {
        /// Entry point identifier.
        node: usize,
        /// Layer recorded for the entry point.
        entry_level: usize,
        /// Highest level of any node.
        max_level: usize,
    },
    /// A stored vector disagrees with the index dimensionality.
    #[error("node {node} has dimension {actual}, expected {expected}")]
    DimensionMismatch {
        /// Offending node.
        node: usize,
        /// Index dimensionality.
        expected: usize,
        /// Dimensionality of the stored vector.
        actual: usize,
    },
}

/// Helper returned by [`HnswIndex::invariants`] to run structural checks.
#[derive(Debug)]
pub struct HnswInvariantChecker<'index> {
    index: &'index HnswIndex,
}

impl<'index> HnswInvariantChecker<'index> {
    pub(super) const fn new(index: &'index HnswIndex) -> Self {
        Self { index }
    }

    /// Runs all invariants, returning the first violation encountered.
    ///
    /// # Errors
    /// Returns the first [`HnswInvariantViolation`] found.
    pub fn check_all(&self) -> Result<(), HnswInvariantViolation> {
        self.check_many(HnswInvariant::all())
    }

    /// Runs a custom subset of invariants in the provided order.
    ///
    /// # Errors
    /// Returns the first [`HnswInvariantViolation`] found.
    pub fn check_many(
        &self,
        invariants: impl IntoIterator<Item = HnswInvariant>,
    ) -> Result<(), HnswInvariantViolation> {
        self.run_with_mode(invariants, EvaluationMode::FailFast)
    }

    /// Runs a single invariant.
    ///
    /// # Errors
    /// Returns the first [`HnswInvariantViolation`] found.
    pub fn check(&self, invariant: HnswInvariant) -> Result<(), HnswInvariantViolation> {
        self.check_many([invariant])
    }

    /// Executes every invariant and returns the full set of violations.
    #[must_use]
    pub fn collect_all(&self) -> Vec<HnswInvariantViolation> {
        self.collect_many(HnswInvariant::all())
    }

    /// Executes the selected invariants and returns every violation discovered.
    #[must_use]
    pub fn collect_many(
        &self,
        invariants: impl IntoIterator<Item = HnswInvariant>,
    ) -> Vec<HnswInvariantViolation> {
        let mut violations = Vec::new();
        let outcome = self.run_with_mode(invariants, EvaluationMode::Collect(&mut violations));
        debug_assert!(outcome.is_ok(), "collect mode records instead of failing");
        violations
    }

    fn run_with_mode(
        &self,
        invariants: impl IntoIterator<Item = HnswInvariant>,
        mut mode: EvaluationMode<'_>,
    ) -> Result<(), HnswInvariantViolation> {
        let ctx = GraphContext {
            graph: &self.index.graph,
            params: self.index.params(),
        };
        for invariant in invariants {
            dispatch(ctx, invariant, &mut mode)?;
        }
        Ok(())
    }
}

fn dispatch(
    ctx: GraphContext<'_>,
    invariant: HnswInvariant,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), HnswInvariantViolation> {
    match invariant {
        HnswInvariant::LayerConsistency => check_layer_consistency(ctx, mode),
        HnswInvariant::DegreeBounds => check_degree_bounds(ctx, mode),
        HnswInvariant::AdjacencyHygiene => check_adjacency_hygiene(ctx, mode),
        HnswInvariant::EntryPoint => check_entry_point(ctx, mode),
        HnswInvariant::DimensionConsistency => check_dimensions(ctx, mode),
    }
}

#[derive(Clone, Copy)]
pub(super) struct GraphContext<'a> {
    graph: &'a Graph,
    params: &'a HnswParams,
}

pub(super) enum EvaluationMode<'a> {
    FailFast,
    Collect(&'a mut Vec<HnswInvariantViolation>),
}

impl EvaluationMode<'_> {
    fn record(&mut self, violation: HnswInvariantViolation) -> Result<(), HnswInvariantViolation> {
        match self {
            Self::FailFast => Err(violation),
            Self::Collect(sink) => {
                sink.push(violation);
                Ok(())
            }
        }
    }
}
