//! Error types emitted by the distance routines.

use thiserror::Error;

/// Errors emitted while computing distances.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[non_exhaustive]
pub enum DistanceError {
    /// Input vectors had different lengths.
    #[error("dimension mismatch: left={left}, right={right}")]
    DimensionMismatch {
        /// Dimensionality of the left-hand vector.
        left: usize,
        /// Dimensionality of the right-hand vector.
        right: usize,
    },
}

/// Convenient alias for distance computations.
pub type Result<T> = core::result::Result<T, DistanceError>;
