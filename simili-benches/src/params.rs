//! Benchmark parameter labels.

use std::fmt;

/// Parameters for an HNSW build benchmark run.
#[derive(Clone, Debug)]
pub struct HnswBenchParams {
    /// Number of points in the dataset.
    pub point_count: usize,
    /// Maximum neighbours per node and layer (M).
    pub max_neighbours: usize,
    /// Search width during construction.
    pub ef_construction: usize,
}

impl fmt::Display for HnswBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "n={},M={},ef={}",
            self.point_count, self.max_neighbours, self.ef_construction
        )
    }
}

/// Parameters for an HNSW search benchmark run.
#[derive(Clone, Debug)]
pub struct SearchBenchParams {
    /// Number of results requested.
    pub k: usize,
    /// Search width at query time.
    pub ef_search: usize,
}

impl fmt::Display for SearchBenchParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "k={},ef={}", self.k, self.ef_search)
    }
}
