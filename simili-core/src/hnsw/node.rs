//! Node storage for the HNSW graph.
//!
//! A node owns its vector and one neighbour list per layer it participates
//! in. The vector never changes after construction; neighbour lists are only
//! mutated by the index while inserting or shrinking.

use crate::hnsw::types::NodeId;

/// A vector and its per-layer adjacency lists.
///
/// # Examples
/// ```
/// use simili_core::Node;
///
/// let node = Node::new(7, vec![1.0, 0.0], 2);
/// assert_eq!(node.level(), 2);
/// assert_eq!(node.level_count(), 3);
/// assert!(node.neighbours(1).is_empty());
/// assert!(node.neighbours(5).is_empty());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    id: NodeId,
    vector: Vec<f32>,
    level: usize,
    neighbours: Vec<Vec<NodeId>>,
}

impl Node {
    /// Creates a node with empty neighbour lists for layers `0..=level`.
    #[must_use]
    pub fn new(id: NodeId, vector: Vec<f32>, level: usize) -> Self {
        let mut neighbours = Vec::with_capacity(level + 1);
        neighbours.resize_with(level + 1, Vec::new);
        Self {
            id,
            vector,
            level,
            neighbours,
        }
    }

    /// Reassembles a node from persisted parts.
    ///
    /// No structural checks run here; [`crate::HnswIndex::from_nodes`]
    /// validates the assembled graph as a whole.
    #[must_use]
    pub const fn from_parts(
        id: NodeId,
        vector: Vec<f32>,
        level: usize,
        neighbours: Vec<Vec<NodeId>>,
    ) -> Self {
        Self {
            id,
            vector,
            level,
            neighbours,
        }
    }

    /// Returns the node identifier.
    #[must_use]
    #[rustfmt::skip]
    pub const fn id(&self) -> NodeId { self.id }

    /// Returns the stored vector.
    #[must_use]
    #[rustfmt::skip]
    pub fn vector(&self) -> &[f32] { &self.vector }

    /// Returns the highest layer this node participates in.
    #[must_use]
    #[rustfmt::skip]
    pub const fn level(&self) -> usize { self.level }

    /// Returns the number of allocated neighbour lists.
    #[must_use]
    #[rustfmt::skip]
    pub fn level_count(&self) -> usize { self.neighbours.len() }

    /// Returns the neighbours at `level`, or an empty slice when the node has
    /// no list for that layer.
    #[must_use]
    pub fn neighbours(&self, level: usize) -> &[NodeId] {
        self.neighbours.get(level).map_or(&[], Vec::as_slice)
    }

    /// Returns every neighbour list, indexed by layer.
    #[must_use]
    #[rustfmt::skip]
    pub fn layers(&self) -> &[Vec<NodeId>] { &self.neighbours }

    /// Iterates over `(level, neighbour)` pairs across every layer.
    pub fn iter_neighbours(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        self.neighbours
            .iter()
            .enumerate()
            .flat_map(|(level, list)| list.iter().map(move |&id| (level, id)))
    }

    pub(crate) fn neighbours_mut(&mut self, level: usize) -> Option<&mut Vec<NodeId>> {
        self.neighbours.get_mut(level)
    }
}
