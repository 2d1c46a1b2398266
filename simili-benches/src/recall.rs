//! Recall measurement against an exhaustive cosine oracle.

use std::collections::{BinaryHeap, HashSet};

use simili_core::{HnswIndex, Neighbour, cosine_distance};

use crate::{error::BenchSetupError, source::SyntheticSource};

/// Integer recall score; convert to a fraction only when reporting.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct RecallScore {
    /// Number of true neighbours found by the approximate search.
    pub hits: usize,
    /// Target count (min of k and oracle length).
    pub total: usize,
}

impl RecallScore {
    /// Adds another score to this one.
    #[must_use]
    pub const fn merge(self, other: Self) -> Self {
        Self {
            hits: self.hits + other.hits,
            total: self.total + other.total,
        }
    }
}

/// Computes the exact top-k neighbours of `query` by exhaustive scan.
///
/// Identifiers are positions in `source`, matching an index built by
/// inserting the source in order with `insert_next`.
///
/// # Errors
///
/// Returns [`BenchSetupError::Distance`] when `query` has a different
/// dimensionality from the source vectors.
pub fn brute_force_top_k(
    source: &SyntheticSource,
    query: &[f32],
    k: usize,
) -> Result<Vec<Neighbour>, BenchSetupError> {
    if k == 0 {
        return Ok(Vec::new());
    }

    let mut heap: BinaryHeap<Neighbour> = BinaryHeap::with_capacity(k + 1);
    for (id, candidate) in source.vectors().enumerate() {
        let distance = cosine_distance(query, candidate)?;
        heap.push(Neighbour { id, distance });
        if heap.len() > k {
            heap.pop();
        }
    }

    let mut neighbours = heap.into_vec();
    neighbours.sort_unstable();
    Ok(neighbours)
}

/// Computes recall@k as integer hits over a target count.
///
/// Both lists are truncated to `min(k, oracle.len(), observed.len())`.
///
/// # Examples
///
/// ```
/// use simili_benches::recall::{recall_at_k, RecallScore};
/// use simili_core::Neighbour;
///
/// let oracle = vec![
///     Neighbour { id: 0, distance: 0.1 },
///     Neighbour { id: 1, distance: 0.2 },
/// ];
/// let observed = vec![
///     Neighbour { id: 0, distance: 0.1 },
///     Neighbour { id: 2, distance: 0.3 },
/// ];
/// let score = recall_at_k(&oracle, &observed, 2);
/// assert_eq!(score, RecallScore { hits: 1, total: 2 });
/// ```
#[must_use]
pub fn recall_at_k(oracle: &[Neighbour], observed: &[Neighbour], k: usize) -> RecallScore {
    let target = k.min(oracle.len()).min(observed.len());
    if target == 0 {
        return RecallScore::default();
    }
    let oracle_ids: HashSet<usize> = oracle.iter().take(target).map(|n| n.id).collect();
    let hits = observed
        .iter()
        .take(target)
        .filter(|neighbour| oracle_ids.contains(&neighbour.id))
        .count();
    RecallScore {
        hits,
        total: target,
    }
}

/// Aggregates recall@k of `index` over `queries`.
///
/// # Errors
///
/// Returns [`BenchSetupError`] when a search or oracle distance fails.
pub fn measure_recall(
    index: &HnswIndex,
    source: &SyntheticSource,
    queries: &SyntheticSource,
    k: usize,
    ef_search: usize,
) -> Result<RecallScore, BenchSetupError> {
    queries.vectors().try_fold(RecallScore::default(), |score, query| {
        let oracle = brute_force_top_k(source, query, k)?;
        let observed = index.find_nearest_neighbours_scored(query, k, Some(ef_search))?;
        Ok(score.merge(recall_at_k(&oracle, &observed, k)))
    })
}
