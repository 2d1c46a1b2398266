//! Parameter handling for the HNSW index.

use crate::hnsw::error::HnswError;

const DEFAULT_MAX_LEVEL: usize = 16;

/// Configuration parameters for an [`crate::HnswIndex`].
///
/// Parameters are fixed for the lifetime of an index; there is no live
/// reconfiguration.
#[derive(Clone, Debug, PartialEq)]
pub struct HnswParams {
    max_neighbours: usize,
    ef_construction: usize,
    level_normalization_factor: f64,
    max_level: usize,
    dimension: Option<usize>,
}

impl HnswParams {
    /// Creates a new parameter set with explicit neighbour fan-out and
    /// construction search width.
    ///
    /// The level normalisation factor defaults to `1 / ln(max_neighbours)`,
    /// falling back to `1.0` when `max_neighbours` is one.
    ///
    /// # Errors
    /// Returns [`HnswError::InvalidParameters`] when `max_neighbours` is zero or
    /// when `ef_construction` is smaller than `max_neighbours`.
    ///
    /// # Examples
    /// ```
    /// use simili_core::HnswParams;
    /// let params = HnswParams::new(16, 64).expect("parameters must be valid");
    /// assert_eq!(params.max_neighbours(), 16);
    /// assert_eq!(params.ef_construction(), 64);
    /// ```
    pub fn new(max_neighbours: usize, ef_construction: usize) -> Result<Self, HnswError> {
        if max_neighbours == 0 {
            return Err(HnswError::InvalidParameters {
                reason: "max_neighbours must be greater than zero".into(),
            });
        }
        if ef_construction < max_neighbours {
            return Err(HnswError::InvalidParameters {
                reason: format!(
                    "ef_construction ({ef_construction}) must be >= max_neighbours ({max_neighbours})"
                ),
            });
        }
        Ok(Self {
            max_neighbours,
            ef_construction,
            level_normalization_factor: default_level_factor(max_neighbours),
            max_level: DEFAULT_MAX_LEVEL,
            dimension: None,
        })
    }

    /// Overrides the factor applied to `-ln(u)` when sampling node levels.
    ///
    /// A factor of zero places every node on layer 0.
    ///
    /// # Errors
    /// Returns [`HnswError::InvalidParameters`] when the factor is negative or
    /// not finite.
    pub fn with_level_normalization_factor(mut self, factor: f64) -> Result<Self, HnswError> {
        if !factor.is_finite() || factor < 0.0 {
            return Err(HnswError::InvalidParameters {
                reason: format!(
                    "level_normalization_factor must be finite and non-negative (got {factor})"
                ),
            });
        }
        self.level_normalization_factor = factor;
        Ok(self)
    }

    /// Caps the highest layer that will be sampled for new nodes.
    #[must_use]
    pub const fn with_max_level(mut self, max_level: usize) -> Self {
        self.max_level = max_level;
        self
    }

    /// Fixes the vector dimensionality up front instead of adopting the
    /// dimensionality of the first inserted vector.
    ///
    /// # Errors
    /// Returns [`HnswError::InvalidParameters`] when `dimension` is zero.
    pub fn with_dimension(mut self, dimension: usize) -> Result<Self, HnswError> {
        if dimension == 0 {
            return Err(HnswError::InvalidParameters {
                reason: "dimension must be greater than zero".into(),
            });
        }
        self.dimension = Some(dimension);
        Ok(self)
    }

    /// Returns the per-layer degree bound `M`.
    #[must_use]
    #[rustfmt::skip]
    pub const fn max_neighbours(&self) -> usize { self.max_neighbours }

    /// Returns the construction search breadth (`ef_construction`).
    #[must_use]
    #[rustfmt::skip]
    pub const fn ef_construction(&self) -> usize { self.ef_construction }

    /// Returns the factor applied when sampling node levels.
    #[must_use]
    #[rustfmt::skip]
    pub const fn level_normalization_factor(&self) -> f64 { self.level_normalization_factor }

    /// Returns the highest layer a sampled level may reach.
    #[must_use]
    #[rustfmt::skip]
    pub const fn max_level(&self) -> usize { self.max_level }

    /// Returns the configured dimensionality, if one was fixed up front.
    #[must_use]
    #[rustfmt::skip]
    pub const fn dimension(&self) -> Option<usize> { self.dimension }
}

impl Default for HnswParams {
    fn default() -> Self {
        Self {
            max_neighbours: 16,
            ef_construction: 64,
            level_normalization_factor: default_level_factor(16),
            max_level: DEFAULT_MAX_LEVEL,
            dimension: None,
        }
    }
}

fn default_level_factor(max_neighbours: usize) -> f64 {
    if max_neighbours > 1 {
        f64::from(u32::try_from(max_neighbours).unwrap_or(u32::MAX))
            .ln()
            .recip()
    } else {
        1.0
    }
}
