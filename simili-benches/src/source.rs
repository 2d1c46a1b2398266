//! Synthetic vector sets for benchmarking.
//!
//! Vectors are drawn from a seeded RNG so runs are reproducible. Two layouts
//! are offered: uniform noise in the unit hypercube, and points scattered
//! around a handful of random directions, which is closer to real embedding
//! data.

use rand::{Rng, SeedableRng, rngs::SmallRng};

/// Errors that may occur during synthetic source generation.
#[derive(Clone, Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyntheticError {
    /// The requested point count was zero.
    #[error("point count must be greater than zero")]
    ZeroPoints,
    /// The requested dimension count was zero.
    #[error("dimension count must be greater than zero")]
    ZeroDimensions,
    /// Clustered generation was asked for zero clusters.
    #[error("cluster count must be greater than zero")]
    ZeroClusters,
}

/// Configuration for synthetic vector generation.
#[derive(Clone, Debug)]
pub struct SyntheticConfig {
    /// Number of points to generate.
    pub point_count: usize,
    /// Dimensionality of each vector.
    pub dimensions: usize,
    /// RNG seed for reproducibility.
    pub seed: u64,
}

/// Pre-generated vectors shared by benchmark runs.
///
/// # Examples
///
/// ```
/// use simili_benches::source::{SyntheticConfig, SyntheticSource};
///
/// let config = SyntheticConfig { point_count: 10, dimensions: 4, seed: 42 };
/// let source = SyntheticSource::generate(&config).expect("valid config");
/// assert_eq!(source.len(), 10);
/// assert_eq!(source.vector(3).map(<[f32]>::len), Some(4));
/// ```
#[derive(Clone, Debug)]
pub struct SyntheticSource {
    vectors: Vec<Vec<f32>>,
    dimensions: usize,
}

impl SyntheticSource {
    /// Generates uniform vectors with components in `[-1, 1)`.
    ///
    /// # Errors
    ///
    /// Returns [`SyntheticError::ZeroPoints`] if `point_count` is zero,
    /// or [`SyntheticError::ZeroDimensions`] if `dimensions` is zero.
    pub fn generate(config: &SyntheticConfig) -> Result<Self, SyntheticError> {
        validate(config)?;
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let vectors = (0..config.point_count)
            .map(|_| random_vector(&mut rng, config.dimensions))
            .collect();
        Ok(Self {
            vectors,
            dimensions: config.dimensions,
        })
    }

    /// Generates points around `clusters` random directions, each component
    /// perturbed by up to `spread`.
    ///
    /// # Errors
    ///
    /// Returns the errors of [`SyntheticSource::generate`], or
    /// [`SyntheticError::ZeroClusters`] if `clusters` is zero.
    #[expect(
        clippy::float_arithmetic,
        reason = "points are centres offset by bounded noise"
    )]
    pub fn generate_clustered(
        config: &SyntheticConfig,
        clusters: usize,
        spread: f32,
    ) -> Result<Self, SyntheticError> {
        validate(config)?;
        if clusters == 0 {
            return Err(SyntheticError::ZeroClusters);
        }
        let mut rng = SmallRng::seed_from_u64(config.seed);
        let jitter = spread.abs();
        let centres: Vec<Vec<f32>> = (0..clusters)
            .map(|_| random_vector(&mut rng, config.dimensions))
            .collect();
        let vectors = centres
            .iter()
            .cycle()
            .take(config.point_count)
            .map(|centre| {
                centre
                    .iter()
                    .map(|component| component + rng.gen_range(-jitter..=jitter))
                    .collect()
            })
            .collect();
        Ok(Self {
            vectors,
            dimensions: config.dimensions,
        })
    }

    /// Number of vectors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Returns whether the source holds no vectors.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Dimensionality shared by every vector.
    #[must_use]
    pub const fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Returns the vector at `index`.
    #[must_use]
    pub fn vector(&self, index: usize) -> Option<&[f32]> {
        self.vectors.get(index).map(Vec::as_slice)
    }

    /// Iterates over every vector in generation order.
    pub fn vectors(&self) -> impl Iterator<Item = &[f32]> {
        self.vectors.iter().map(Vec::as_slice)
    }
}

fn validate(config: &SyntheticConfig) -> Result<(), SyntheticError> {
    if config.point_count == 0 {
        return Err(SyntheticError::ZeroPoints);
    }
    if config.dimensions == 0 {
        return Err(SyntheticError::ZeroDimensions);
    }
    Ok(())
}

fn random_vector(rng: &mut SmallRng, dimensions: usize) -> Vec<f32> {
    (0..dimensions).map(|_| rng.gen_range(-1.0..1.0)).collect()
}
