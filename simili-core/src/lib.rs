//! Simili core library.
//!
//! An embedded approximate nearest-neighbour index built on a Hierarchical
//! Navigable Small World (HNSW) graph over cosine distance, together with the
//! snapshot boundary used to persist it and the document collection that maps
//! stored text onto node identifiers.
//!
//! # Metrics
//!
//! When the `metrics` feature is enabled the index emits:
//!
//! - `simili_hnsw_inserts_total` (counter)
//! - `simili_hnsw_searches_total` (counter)
//! - `simili_hnsw_shrinks_total` (counter)
#![cfg_attr(docsrs, feature(doc_cfg))]

mod collection;
mod distance;
mod error;
mod hnsw;
mod snapshot;

pub use crate::{
    collection::{
        Collection, CollectionError, CollectionErrorCode, CollectionSnapshot, Embedder, Record,
        SearchHit,
    },
    distance::{DistanceError, cosine_distance, cosine_similarity},
    hnsw::{
        HnswError, HnswErrorCode, HnswIndex, HnswInvariant, HnswInvariantChecker,
        HnswInvariantViolation, HnswParams, LayerConsistencyDetail, Neighbour, Node, NodeId,
        sample_level,
    },
    snapshot::{IndexSnapshot, NodeSnapshot, ParamsSnapshot, SnapshotError, SnapshotErrorCode},
};
