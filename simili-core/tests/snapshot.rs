//! Snapshot persistence round trips through the filesystem.

mod common;

use rstest::rstest;
use simili_core::{
    HnswIndex, HnswParams, IndexSnapshot, SnapshotError, SnapshotErrorCode,
};
use tempfile::TempDir;

use crate::common::{build_index, random_vectors};

#[rstest]
fn saved_index_answers_queries_identically() {
    let params = HnswParams::new(5, 20).expect("params");
    let vectors = random_vectors(80, 5, 23);
    let index = build_index(params, &vectors, 23);

    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("index.json");
    index.save_json(&path).expect("save");
    let restored = HnswIndex::load_json(&path).expect("load");

    assert_eq!(restored.len(), index.len());
    assert_eq!(restored.entry_point(), index.entry_point());
    assert_eq!(restored.max_level(), index.max_level());
    assert_eq!(restored.next_id(), index.next_id());
    for query in random_vectors(10, 5, 99) {
        assert_eq!(
            restored.find_nearest_neighbours(&query, 5, None).expect("query"),
            index.find_nearest_neighbours(&query, 5, None).expect("query"),
        );
    }
}

#[rstest]
fn snapshot_document_is_stable_json() {
    let params = HnswParams::new(2, 4).expect("params");
    let index = build_index(params, &[vec![1.0, 0.0], vec![0.0, 1.0]], 1);

    let value = serde_json::to_value(index.snapshot()).expect("serialise");
    assert_eq!(value["params"]["max_neighbours"], 2);
    assert_eq!(value["dimension"], 2);
    assert_eq!(value["nodes"][0]["id"], 0);
    assert_eq!(value["nodes"][1]["neighbours"][0][0], 0);
}

#[rstest]
fn corrupted_snapshot_is_rejected_on_load() {
    let params = HnswParams::new(2, 4).expect("params");
    let index = build_index(params, &[vec![1.0, 0.0], vec![0.0, 1.0], vec![1.0, 1.0]], 8);
    let mut snapshot: IndexSnapshot = index.snapshot();
    snapshot.nodes[1].neighbours[0].push(1);

    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("corrupt.json");
    snapshot.save_json(&path).expect("save");
    let err = HnswIndex::load_json(&path).expect_err("self loop must be rejected");
    assert_eq!(err.code(), SnapshotErrorCode::Index);
    assert!(matches!(err, SnapshotError::Index { .. }));
}

#[rstest]
fn empty_index_round_trips() {
    let params = HnswParams::new(3, 6).expect("params");
    let dir = TempDir::new().expect("tempdir");
    let path = dir.path().join("empty.json");
    HnswIndex::new(params).save_json(&path).expect("save");

    let restored = HnswIndex::load_json(&path).expect("load");
    assert!(restored.is_empty());
    assert_eq!(restored.entry_point(), None);
    assert_eq!(restored.params().max_neighbours(), 3);
}
