//! Shared fixtures and helpers for HNSW tests.

use rand::{SeedableRng, rngs::SmallRng};

use crate::hnsw::{HnswIndex, HnswParams, Neighbour, graph::Graph, node::Node, types::NodeId};

/// Builds a graph from explicit nodes, deriving the entry point the same way
/// a restored index does.
pub(super) fn graph_from(nodes: Vec<Node>) -> Graph {
    Graph::restore(None, nodes).expect("fixture graph must restore")
}

/// Builds a level-0 node with the given adjacency.
pub(super) fn flat_node(id: NodeId, vector: Vec<f32>, neighbours: Vec<NodeId>) -> Node {
    Node::from_parts(id, vector, 0, vec![neighbours])
}

/// Inserts `vectors` in order under identifiers `0..n`.
pub(super) fn build_index(params: HnswParams, vectors: &[Vec<f32>], seed: u64) -> HnswIndex {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut index = HnswIndex::new(params);
    for (id, vector) in vectors.iter().enumerate() {
        index
            .insert(id, vector.clone(), &mut rng)
            .expect("fixture insert must succeed");
    }
    index
}

/// Unit vector at `degrees` from the x axis.
pub(super) fn unit(degrees: f32) -> Vec<f32> {
    let radians = degrees.to_radians();
    vec![radians.cos(), radians.sin()]
}

pub(super) fn assert_sorted_by_distance(neighbours: &[Neighbour]) {
    for window in neighbours.windows(2) {
        if let [left, right] = window {
            assert!(
                left.distance <= right.distance,
                "distances must be non-decreasing: {neighbours:?}",
            );
        }
    }
}
