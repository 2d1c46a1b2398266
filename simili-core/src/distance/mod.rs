//! Distance primitives used by the HNSW index.
//!
//! Only cosine distance is provided. All arithmetic stays in `f32` so that
//! neighbour ordering and tie-breaking are identical wherever a distance is
//! recomputed.

mod cosine;
mod helpers;
mod types;

pub use self::cosine::{cosine_distance, cosine_similarity};
pub use self::types::DistanceError;
