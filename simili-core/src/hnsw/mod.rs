//! Hierarchical Navigable Small World (HNSW) graph index.
//!
//! Nodes live on layers `0..=level`, where the level is sampled once per node
//! and higher layers hold exponentially fewer nodes. Searches descend from the
//! entry point through the sparse upper layers with single-width searches and
//! finish with a wide search on layer 0. Insertion follows the same descent,
//! links the new node to a diverse neighbour set on each of its layers, and
//! prunes neighbours whose degree overflows.
//!
//! The index is single-writer: mutation takes `&mut self`.

mod error;
mod graph;
mod index;
mod insert;
mod invariants;
mod level;
mod node;
mod params;
mod search;
mod select;
mod types;
mod validate;

pub use self::{
    error::{HnswError, HnswErrorCode},
    index::HnswIndex,
    invariants::{
        HnswInvariant, HnswInvariantChecker, HnswInvariantViolation, LayerConsistencyDetail,
    },
    level::sample_level,
    node::Node,
    params::HnswParams,
    types::{Neighbour, NodeId},
};

#[cfg(test)]
mod tests;
