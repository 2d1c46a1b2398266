//! Shared fixtures for the `simili-core` integration tests.

use std::convert::Infallible;

use rand::{Rng, SeedableRng, rngs::SmallRng};
use simili_core::{Embedder, HnswIndex, HnswParams};

/// Bag-of-words embedder hashing each lower-cased token into a bucket.
#[derive(Clone, Copy, Debug)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    #[must_use]
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    #[expect(
        clippy::integer_division_remainder_used,
        clippy::cast_possible_truncation,
        reason = "the hash is reduced modulo the dimension, which fits in usize"
    )]
    fn bucket(&self, token: &str) -> usize {
        let hash = token
            .bytes()
            .fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
                (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
            });
        (hash % self.dimension as u64) as usize
    }
}

impl Embedder for HashingEmbedder {
    type Error = Infallible;

    fn dimension(&self) -> usize {
        self.dimension
    }

    #[expect(clippy::float_arithmetic, reason = "token counts accumulate per bucket")]
    fn embed(&self, text: &str) -> Result<Vec<f32>, Infallible> {
        let mut vector = vec![0.0; self.dimension];
        for token in text.split_whitespace() {
            vector[self.bucket(&token.to_lowercase())] += 1.0;
        }
        Ok(vector)
    }
}

/// Draws `count` vectors with components in `[-1, 1)`.
#[must_use]
pub fn random_vectors(count: usize, dimension: usize, seed: u64) -> Vec<Vec<f32>> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..count)
        .map(|_| (0..dimension).map(|_| rng.gen_range(-1.0..1.0)).collect())
        .collect()
}

/// Builds an index holding `vectors` under identifiers `0..vectors.len()`.
#[must_use]
pub fn build_index(params: HnswParams, vectors: &[Vec<f32>], seed: u64) -> HnswIndex {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut index = HnswIndex::new(params);
    for vector in vectors {
        index
            .insert_next(vector.clone(), &mut rng)
            .expect("fixture vectors must insert");
    }
    index
}
