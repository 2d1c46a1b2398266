#![expect(
    clippy::float_arithmetic,
    clippy::integer_division_remainder_used,
    reason = "distances are compared with a tolerance and queries wrap around the fixture"
)]

use proptest::{prop_assert, prop_assert_eq, proptest};
use rand::{SeedableRng, rngs::SmallRng};

use super::strategies::{IndexFixture, dataset_strategy, index_fixture_strategy};
use crate::{
    distance::cosine_distance,
    hnsw::{HnswIndex, HnswParams},
};

fn build(fixture: &IndexFixture) -> HnswIndex {
    let params = HnswParams::new(fixture.max_neighbours, fixture.ef_construction)
        .expect("strategy yields valid params")
        .with_level_normalization_factor(fixture.level_factor)
        .expect("strategy yields a valid factor");
    let mut rng = SmallRng::seed_from_u64(fixture.seed);
    let mut index = HnswIndex::new(params);
    for (id, vector) in fixture.vectors.iter().enumerate() {
        index
            .insert(id, vector.clone(), &mut rng)
            .expect("generated vectors are valid");
    }
    index
}

proptest! {
    #[test]
    fn construction_preserves_structure(fixture in index_fixture_strategy()) {
        let index = build(&fixture);
        prop_assert_eq!(index.len(), fixture.vectors.len());
        prop_assert_eq!(index.dimension(), Some(fixture.dimension()));

        let highest = index.nodes().map(|node| node.level()).max();
        prop_assert_eq!(index.max_level(), highest);
        let entry = index.entry_point().expect("populated index has an entry point");
        prop_assert_eq!(index.node(entry).map(|node| node.level()), highest);

        for node in index.nodes() {
            prop_assert_eq!(node.layers().len(), node.level() + 1);
            for layer in node.layers() {
                prop_assert!(layer.len() <= fixture.max_neighbours);
            }
        }
        let violations = index.invariants().collect_all();
        prop_assert!(violations.is_empty(), "violations: {violations:?}");
    }

    #[test]
    fn queries_are_idempotent(fixture in index_fixture_strategy(), probe in 0_usize..48) {
        let index = build(&fixture);
        let query = &fixture.vectors[probe % fixture.vectors.len()];
        let first = index.find_nearest_neighbours(query, 5, None).expect("search");
        let second = index.find_nearest_neighbours(query, 5, None).expect("search");
        prop_assert_eq!(first, second);
    }

    #[test]
    fn inserted_vectors_are_found((vectors, seed) in dataset_strategy(24)) {
        // With M >= n nothing is pruned and ef >= n explores all of layer 0.
        let n = vectors.len();
        let params = HnswParams::new(n, n).expect("params");
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut index = HnswIndex::new(params);
        for (id, vector) in vectors.iter().enumerate() {
            index.insert(id, vector.clone(), &mut rng).expect("insert");
        }

        for (id, vector) in vectors.iter().enumerate() {
            let found = index
                .find_nearest_neighbours_scored(vector, 1, Some(n))
                .expect("search");
            let best = found.first().expect("populated index returns a result");
            prop_assert!(
                best.id == id || best.distance <= 1.0e-6,
                "expected node {id}, got {best:?}"
            );
            prop_assert!(best.distance <= 1.0e-6);
        }
    }

    #[test]
    fn oversized_k_returns_every_reachable_node((vectors, seed) in dataset_strategy(16)) {
        let n = vectors.len();
        let params = HnswParams::new(n, n).expect("params");
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut index = HnswIndex::new(params);
        for (id, vector) in vectors.iter().enumerate() {
            index.insert(id, vector.clone(), &mut rng).expect("insert");
        }
        let found = index
            .find_nearest_neighbours(&vectors[0], n + 10, None)
            .expect("search");
        prop_assert_eq!(found.len(), n);
    }

    #[test]
    fn cosine_distance_is_symmetric((vectors, _seed) in dataset_strategy(2)) {
        let a = &vectors[0];
        let b = vectors.get(1).unwrap_or(a);
        let forward = cosine_distance(a, b).expect("same dimension");
        let backward = cosine_distance(b, a).expect("same dimension");
        prop_assert!((forward - backward).abs() <= 1.0e-6);
        let own = cosine_distance(a, a).expect("same dimension");
        prop_assert!(own.abs() <= 1.0e-5);
    }
}
