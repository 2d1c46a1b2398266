//! Random level assignment for new nodes.

use rand::{Rng, distributions::Standard};

/// Samples a node level as `floor(-ln(u) * level_factor)` with `u` drawn
/// uniformly from `(0, 1]`.
///
/// Layer 0 is the most populous; each further layer is reached with
/// geometrically decreasing probability. A typical factor is `1 / ln(M)`.
///
/// # Examples
/// ```
/// use rand::{SeedableRng, rngs::SmallRng};
/// use simili_core::sample_level;
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// assert_eq!(sample_level(0.0, &mut rng), 0);
/// ```
#[expect(
    clippy::float_arithmetic,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "levels follow an exponential draw floored to a non-negative integer"
)]
pub fn sample_level<R: Rng + ?Sized>(level_factor: f64, rng: &mut R) -> usize {
    // `Standard` yields [0, 1); flipping it keeps ln() away from zero.
    let draw: f64 = rng.sample(Standard);
    let uniform = 1.0 - draw;
    let level = (-uniform.ln() * level_factor).floor();
    if level.is_finite() && level > 0.0 {
        level as usize
    } else {
        0
    }
}

/// Samples a level and clamps it to `max_level`.
pub(crate) fn sample_capped_level<R: Rng + ?Sized>(
    level_factor: f64,
    max_level: usize,
    rng: &mut R,
) -> usize {
    sample_level(level_factor, rng).min(max_level)
}
