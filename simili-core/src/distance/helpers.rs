//! Shared helpers for distance implementations.

use super::types::{DistanceError, Result};

/// Ensures both vectors share the same dimensionality.
pub(crate) fn validate_dimensions(left: &[f32], right: &[f32]) -> Result<()> {
    if left.len() != right.len() {
        return Err(DistanceError::DimensionMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(())
}

/// Accumulates the dot product and squared magnitudes across both vectors.
#[expect(
    clippy::float_arithmetic,
    reason = "dot products and squared norms are sums of products"
)]
pub(crate) fn accumulate_components(left: &[f32], right: &[f32]) -> (f32, f32, f32) {
    let mut dot = 0.0f32;
    let mut left_squares = 0.0f32;
    let mut right_squares = 0.0f32;

    for (&l, &r) in left.iter().zip(right.iter()) {
        dot += l * r;
        left_squares += l * l;
        right_squares += r * r;
    }

    (dot, left_squares, right_squares)
}
