//! Benchmark setup error type.
//!
//! Lets setup helpers propagate failures with `?` instead of panicking inside
//! Criterion closures.

use simili_core::{DistanceError, HnswError};

use crate::source::SyntheticError;

/// Errors that may occur during benchmark setup.
#[derive(Debug, thiserror::Error)]
pub enum BenchSetupError {
    /// Synthetic data generation failed.
    #[error("synthetic source generation failed: {0}")]
    Synthetic(#[from] SyntheticError),
    /// HNSW parameter validation, build or search failed.
    #[error("HNSW operation failed: {0}")]
    Hnsw(#[from] HnswError),
    /// An exact distance computation failed.
    #[error("distance computation failed: {0}")]
    Distance(#[from] DistanceError),
}
