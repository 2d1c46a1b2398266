use crate::distance::helpers::{accumulate_components, validate_dimensions};
use crate::distance::types::Result;

/// Computes the cosine distance `1 - cosine_similarity(left, right)`.
///
/// Smaller values mean more similar vectors. The result lies in `[0, 2]`.
/// When either vector has zero magnitude the similarity is taken to be `0`,
/// so the distance is `1`.
///
/// # Examples
///
/// ```
/// use simili_core::{DistanceError, cosine_distance};
///
/// fn main() -> Result<(), DistanceError> {
///     let orthogonal = cosine_distance(&[1.0, 0.0], &[0.0, 1.0])?;
///     assert!((orthogonal - 1.0).abs() < 1e-6);
///
///     let zero = cosine_distance(&[0.0, 0.0], &[1.0, 0.0])?;
///     assert!((zero - 1.0).abs() < f32::EPSILON);
///     Ok(())
/// }
/// ```
///
/// # Errors
///
/// Returns [`crate::DistanceError::DimensionMismatch`] when input lengths
/// differ.
#[expect(
    clippy::float_arithmetic,
    reason = "distance is defined as the complement of the similarity"
)]
pub fn cosine_distance(left: &[f32], right: &[f32]) -> Result<f32> {
    let similarity = cosine_similarity(left, right)?;
    Ok(1.0 - similarity)
}

/// Computes the cosine similarity `dot(left, right) / (|left| * |right|)`.
///
/// The value is clamped to `[-1, 1]` to absorb rounding noise. Zero-magnitude
/// inputs yield `0`.
///
/// # Examples
///
/// ```
/// use simili_core::cosine_similarity;
///
/// let parallel = cosine_similarity(&[2.0, 0.0], &[5.0, 0.0]).expect("same dimension");
/// assert!((parallel - 1.0).abs() < 1e-6);
/// ```
///
/// # Errors
///
/// Returns [`crate::DistanceError::DimensionMismatch`] when input lengths
/// differ.
#[expect(
    clippy::float_arithmetic,
    reason = "similarity normalises the dot product by both magnitudes"
)]
pub fn cosine_similarity(left: &[f32], right: &[f32]) -> Result<f32> {
    validate_dimensions(left, right)?;

    let (dot, left_squares, right_squares) = accumulate_components(left, right);
    if left_squares == 0.0 || right_squares == 0.0 {
        return Ok(0.0);
    }

    let similarity = dot / (left_squares.sqrt() * right_squares.sqrt());
    // Theoretical range is [-1, 1], but numerical noise can spill over.
    Ok(similarity.clamp(-1.0, 1.0))
}
