//! Types for HNSW graph operations (entry points, plans, and neighbour
//! ordering semantics). Distances are finite `f32` values because vectors are
//! validated before they enter the graph.

use std::cmp::Ordering;

/// Identifier of a node within an [`crate::HnswIndex`].
pub type NodeId = usize;

/// Entry point into the hierarchical graph used when searching.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct EntryPoint {
    pub(crate) node: NodeId,
    pub(crate) level: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct InsertionPlan {
    pub(crate) layers: Vec<LayerPlan>,
}

#[derive(Clone, Debug)]
pub(crate) struct LayerPlan {
    pub(crate) level: usize,
    pub(crate) neighbours: Vec<NodeId>,
}

/// Neighbour discovered during a search, including its distance from the query.
///
/// # Examples
/// ```
/// use simili_core::Neighbour;
///
/// let neighbour = Neighbour { id: 3, distance: 0.42 };
/// assert_eq!(neighbour.id, 3);
/// assert!(neighbour.distance < 1.0);
/// ```
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Neighbour {
    /// Identifier of the neighbouring node.
    pub id: NodeId,
    /// Cosine distance between the query and [`Neighbour::id`].
    pub distance: f32,
}

impl Eq for Neighbour {}

impl Ord for Neighbour {
    fn cmp(&self, other: &Self) -> Ordering {
        self.distance
            .total_cmp(&other.distance)
            .then(self.id.cmp(&other.id))
    }
}

impl PartialOrd for Neighbour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Search-local wrapper ordering neighbours by distance and then by the order
/// in which the search discovered them.
///
/// # Examples
/// ```rust,ignore
/// use crate::hnsw::types::RankedNeighbour;
///
/// let ranked = RankedNeighbour::new(4, 0.5, 7);
/// assert_eq!(ranked.into_neighbour().id, 4);
/// ```
#[derive(Clone, Copy, Debug)]
pub(crate) struct RankedNeighbour {
    inner: Neighbour,
    sequence: u64,
}

impl RankedNeighbour {
    pub(crate) const fn new(id: NodeId, distance: f32, sequence: u64) -> Self {
        Self {
            inner: Neighbour { id, distance },
            sequence,
        }
    }

    #[rustfmt::skip]
    pub(crate) const fn distance(&self) -> f32 { self.inner.distance }

    #[rustfmt::skip]
    pub(crate) const fn id(&self) -> NodeId { self.inner.id }

    pub(crate) const fn into_neighbour(self) -> Neighbour {
        self.inner
    }

    pub(crate) fn compare(&self, other: &Self) -> Ordering {
        self.inner
            .distance
            .total_cmp(&other.inner.distance)
            .then(self.sequence.cmp(&other.sequence))
    }
}

impl Eq for RankedNeighbour {}

impl PartialEq for RankedNeighbour {
    fn eq(&self, other: &Self) -> bool {
        self.compare(other) == Ordering::Equal
    }
}

impl Ord for RankedNeighbour {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialOrd for RankedNeighbour {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
