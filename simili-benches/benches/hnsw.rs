//! HNSW build and search benchmarks.
//!
//! Build timings sweep dataset size and `M`; search timings sweep
//! `ef_search` over a fixed clustered dataset. Recall for each search width
//! is printed once during setup so speed can be read against quality.
#![expect(
    missing_docs,
    reason = "Criterion macros generate items without doc comments"
)]

use criterion::{BatchSize, BenchmarkId, Criterion, criterion_group, criterion_main};
use rand::{SeedableRng, rngs::SmallRng};

use simili_benches::{
    error::BenchSetupError,
    params::{HnswBenchParams, SearchBenchParams},
    recall::measure_recall,
    source::{SyntheticConfig, SyntheticSource},
};
use simili_core::{HnswError, HnswIndex, HnswParams};

/// Seed used for all synthetic data generation in this benchmark.
const SEED: u64 = 42;

/// Vector dimensionality for all benchmark datasets.
const DIMENSIONS: usize = 32;

/// Dataset sizes to benchmark.
const POINT_COUNTS: &[usize] = &[100, 500, 1_000, 5_000];

/// HNSW M parameter values to benchmark.
const MAX_NEIGHBOURS: &[usize] = &[8, 16, 24];

/// Dataset size used for search benchmarks.
const SEARCH_POINT_COUNT: usize = 5_000;

/// Search widths to benchmark.
const EF_SEARCH: &[usize] = &[16, 32, 64, 128];

/// Number of neighbours requested per query.
const K: usize = 10;

fn make_source(point_count: usize, seed: u64) -> Result<SyntheticSource, BenchSetupError> {
    Ok(SyntheticSource::generate_clustered(
        &SyntheticConfig {
            point_count,
            dimensions: DIMENSIONS,
            seed,
        },
        16,
        0.2,
    )?)
}

fn build_index(source: &SyntheticSource, params: HnswParams) -> Result<HnswIndex, HnswError> {
    let mut rng = SmallRng::seed_from_u64(SEED);
    let mut index = HnswIndex::new(params);
    for vector in source.vectors() {
        index.insert_next(vector.to_vec(), &mut rng)?;
    }
    Ok(index)
}

#[expect(
    clippy::panic_in_result_fn,
    reason = "Criterion measurement closures cannot propagate errors via Result"
)]
fn hnsw_build_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let mut group = c.benchmark_group("hnsw_build");
    group.sample_size(10);

    for &point_count in POINT_COUNTS {
        let source = make_source(point_count, SEED)?;
        for &m in MAX_NEIGHBOURS {
            let params = HnswParams::new(m, m.saturating_mul(4))?;
            let bench_params = HnswBenchParams {
                point_count,
                max_neighbours: m,
                ef_construction: params.ef_construction(),
            };
            group.bench_with_input(
                BenchmarkId::from_parameter(&bench_params),
                &(&source, &params),
                |b, &(bench_source, input_params)| {
                    b.iter_batched(
                        || input_params.clone(),
                        |cloned_params| {
                            if let Err(err) = build_index(bench_source, cloned_params) {
                                panic!("hnsw_build failed during benchmark: {err}");
                            }
                        },
                        BatchSize::SmallInput,
                    );
                },
            );
        }
    }

    group.finish();
    Ok(())
}

#[expect(
    clippy::panic_in_result_fn,
    clippy::print_stdout,
    reason = "recall is reported on stdout next to Criterion's timings; measurement closures cannot return errors"
)]
fn hnsw_search_impl(c: &mut Criterion) -> Result<(), BenchSetupError> {
    let source = make_source(SEARCH_POINT_COUNT, SEED)?;
    let queries = make_source(100, SEED.wrapping_add(1))?;
    let index = build_index(&source, HnswParams::new(16, 64)?)?;

    let mut group = c.benchmark_group("hnsw_search");
    for &ef_search in EF_SEARCH {
        let score = measure_recall(&index, &source, &queries, K, ef_search)?;
        println!(
            "hnsw_search ef={ef_search}: recall@{K} = {}/{}",
            score.hits, score.total
        );
        let bench_params = SearchBenchParams { k: K, ef_search };
        group.bench_with_input(
            BenchmarkId::from_parameter(&bench_params),
            &ef_search,
            |b, &ef| {
                b.iter(|| {
                    for query in queries.vectors() {
                        if let Err(err) = index.find_nearest_neighbours(query, K, Some(ef)) {
                            panic!("hnsw_search failed during benchmark: {err}");
                        }
                    }
                });
            },
        );
    }
    group.finish();
    Ok(())
}

fn hnsw_build(c: &mut Criterion) {
    if let Err(err) = hnsw_build_impl(c) {
        panic!("hnsw_build benchmark setup failed: {err}");
    }
}

fn hnsw_search(c: &mut Criterion) {
    if let Err(err) = hnsw_search_impl(c) {
        panic!("hnsw_search benchmark setup failed: {err}");
    }
}

criterion_group!(benches, hnsw_build, hnsw_search);
criterion_main!(benches);
