//! Error types produced by the HNSW index.

use thiserror::Error;

use crate::{distance::DistanceError, error::define_error_codes, hnsw::HnswInvariantViolation};

/// Errors produced by the HNSW index.
#[derive(Clone, Debug, Error, PartialEq)]
#[non_exhaustive]
pub enum HnswError {
    /// Parameters were invalid for the current configuration.
    #[error("invalid HNSW parameter: {reason}")]
    InvalidParameters {
        /// Explanation of the rejected value.
        reason: String,
    },
    /// A vector disagreed with the index dimensionality.
    #[error("dimension mismatch: index expects {expected}, vector has {actual}")]
    DimensionMismatch {
        /// Dimensionality established by the index.
        expected: usize,
        /// Dimensionality of the offending vector.
        actual: usize,
    },
    /// A vector without components was supplied.
    #[error("vectors must contain at least one component")]
    EmptyVector,
    /// A vector contained a NaN or infinite component.
    #[error("vector component {position} is not finite")]
    NonFiniteComponent {
        /// Offset of the first non-finite component.
        position: usize,
    },
    /// The same node identifier was inserted more than once.
    #[error("node {node} has already been inserted")]
    DuplicateNode {
        /// Identifier that is already present.
        node: usize,
    },
    /// An operation referenced a node that is not part of the index.
    #[error("node {node} is not part of the index")]
    UnknownNode {
        /// Identifier that could not be resolved.
        node: usize,
    },
    /// Attempted to operate on an inconsistent graph state.
    #[error("HNSW graph invariant violated: {message}")]
    GraphInvariantViolation {
        /// Description of the broken invariant.
        message: String,
    },
    /// A restored node map failed structural validation.
    #[error("snapshot rejected: {source}")]
    InvalidSnapshot {
        /// Violation reported by the invariant checker.
        #[from]
        source: HnswInvariantViolation,
    },
    /// Distance computation failed.
    #[error("distance failure: {source}")]
    Distance {
        /// Underlying distance error.
        #[from]
        source: DistanceError,
    },
}

define_error_codes! {
    /// Stable codes describing [`HnswError`] variants.
    enum HnswErrorCode for HnswError {
        /// Parameters were invalid for the current configuration.
        InvalidParameters => InvalidParameters { .. } => "HNSW_INVALID_PARAMETERS",
        /// A vector disagreed with the index dimensionality.
        DimensionMismatch => DimensionMismatch { .. } => "HNSW_DIMENSION_MISMATCH",
        /// A vector without components was supplied.
        EmptyVector => EmptyVector => "HNSW_EMPTY_VECTOR",
        /// A vector contained a NaN or infinite component.
        NonFiniteComponent => NonFiniteComponent { .. } => "HNSW_NON_FINITE_COMPONENT",
        /// The same node identifier was inserted more than once.
        DuplicateNode => DuplicateNode { .. } => "HNSW_DUPLICATE_NODE",
        /// An operation referenced a node that is not part of the index.
        UnknownNode => UnknownNode { .. } => "HNSW_UNKNOWN_NODE",
        /// Attempted to operate on an inconsistent graph state.
        GraphInvariantViolation => GraphInvariantViolation { .. } => "HNSW_GRAPH_INVARIANT_VIOLATION",
        /// A restored node map failed structural validation.
        InvalidSnapshot => InvalidSnapshot { .. } => "HNSW_INVALID_SNAPSHOT",
        /// Distance computation failed.
        Distance => Distance { .. } => "HNSW_DISTANCE_FAILURE",
    }
}
