//! Strategy builders for property-based HNSW tests.
#![expect(
    clippy::float_arithmetic,
    reason = "degenerate vectors are filtered by squared norm"
)]

use proptest::prelude::*;

/// Vectors, parameters, and RNG seed for one generated index.
#[derive(Clone, Debug)]
pub(super) struct IndexFixture {
    pub(super) vectors: Vec<Vec<f32>>,
    pub(super) max_neighbours: usize,
    pub(super) ef_construction: usize,
    pub(super) level_factor: f64,
    pub(super) seed: u64,
}

impl IndexFixture {
    pub(super) fn dimension(&self) -> usize {
        self.vectors.first().map_or(0, Vec::len)
    }
}

fn non_degenerate_vector(dimension: usize) -> impl Strategy<Value = Vec<f32>> {
    prop::collection::vec(-1.0_f32..1.0, dimension).prop_filter(
        "vectors must have a usable magnitude",
        |vector| vector.iter().map(|component| component * component).sum::<f32>() > 1.0e-3,
    )
}

/// Vectors of a shared dimension together with an arbitrary seed.
pub(super) fn dataset_strategy(max_len: usize) -> impl Strategy<Value = (Vec<Vec<f32>>, u64)> {
    (2_usize..=8).prop_flat_map(move |dimension| {
        (
            prop::collection::vec(non_degenerate_vector(dimension), 1..=max_len),
            any::<u64>(),
        )
    })
}

/// Samples plausible index configurations, pruning included.
pub(super) fn index_fixture_strategy() -> impl Strategy<Value = IndexFixture> {
    (
        dataset_strategy(48),
        2_usize..=6,
        1_usize..=4,
        0.2_f64..=1.5,
    )
        .prop_map(
            |((vectors, seed), max_neighbours, ef_multiplier, level_factor)| IndexFixture {
                vectors,
                max_neighbours,
                ef_construction: max_neighbours * ef_multiplier,
                level_factor,
                seed,
            },
        )
}
