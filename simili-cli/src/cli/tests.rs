//! Unit tests for the CLI commands.

use super::commands::{build_index, read_records, run_build, run_query, run_stats};
use super::{
    BuildCommand, Cli, CliError, Command, ExecutionSummary, QueryCommand, StatsCommand,
    VectorRecord, render_summary, run_cli,
};

use std::fs::File;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Parser;
use rstest::{fixture, rstest};
use simili_core::{HnswError, HnswParams, SnapshotError};
use tempfile::TempDir;

type TestResult = Result<(), Box<dyn std::error::Error>>;

const VECTORS: &str = r#"[
    {"vector": [1.0, 0.0]},
    {"vector": [0.0, 1.0]},
    {"vector": [0.9, 0.1]}
]"#;

#[fixture]
fn temp_dir() -> TempDir {
    match TempDir::new() {
        Ok(dir) => dir,
        Err(err) => panic!("failed to create temp dir: {err}"),
    }
}

fn create_file(dir: &TempDir, name: &str, contents: &str) -> io::Result<PathBuf> {
    let path = dir.path().join(name);
    let mut file = File::create(&path)?;
    file.write_all(contents.as_bytes())?;
    Ok(path)
}

fn build_command(input: PathBuf, output: PathBuf) -> BuildCommand {
    BuildCommand {
        input,
        output,
        max_neighbours: 2,
        ef_construction: 10,
        seed: 1,
    }
}

fn expect_error(result: Result<ExecutionSummary, CliError>, panic_msg: &str) -> CliError {
    match result {
        Ok(_) => panic!("{panic_msg}"),
        Err(err) => err,
    }
}

#[rstest]
fn build_then_query_ranks_exact_match_first(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "vectors.json", VECTORS)?;
    let output = temp_dir.path().join("index.json");
    let built = run_build(build_command(input, output.clone()))?;
    assert_eq!(
        built,
        ExecutionSummary::Built {
            nodes: 3,
            dimension: Some(2),
            output: output.clone(),
        }
    );

    let summary = run_query(&QueryCommand {
        index: output,
        vector: vec![1.0, 0.0],
        k: 1,
        ef_search: None,
    })?;
    let ExecutionSummary::Query { hits } = summary else {
        panic!("query must return hits");
    };
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].id, 0);
    assert!(hits[0].distance.abs() < 1e-6);
    Ok(())
}

#[rstest]
fn stats_reports_graph_shape(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "vectors.json", VECTORS)?;
    let output = temp_dir.path().join("index.json");
    run_build(build_command(input, output.clone()))?;

    let summary = run_stats(&StatsCommand { index: output })?;
    let ExecutionSummary::Stats {
        nodes,
        dimension,
        max_level,
        entry_point,
    } = summary
    else {
        panic!("stats must describe the index");
    };
    assert_eq!(nodes, 3);
    assert_eq!(dimension, Some(2));
    assert!(max_level.is_some());
    assert!(entry_point.is_some());
    Ok(())
}

#[rstest]
fn explicit_ids_are_preserved() -> TestResult {
    let records = vec![
        VectorRecord {
            id: Some(10),
            vector: vec![1.0, 0.0],
        },
        VectorRecord {
            id: None,
            vector: vec![0.0, 1.0],
        },
    ];
    let index = build_index(HnswParams::new(2, 4)?, records, 3)?;
    assert!(index.node(10).is_some());
    assert!(index.node(11).is_some());
    Ok(())
}

#[rstest]
fn duplicate_ids_fail_the_build() -> TestResult {
    let records = vec![
        VectorRecord {
            id: Some(1),
            vector: vec![1.0, 0.0],
        },
        VectorRecord {
            id: Some(1),
            vector: vec![0.0, 1.0],
        },
    ];
    let Err(err) = build_index(HnswParams::new(2, 4)?, records, 3) else {
        panic!("duplicate ids must be rejected");
    };
    assert_eq!(err, HnswError::DuplicateNode { node: 1 });
    Ok(())
}

#[rstest]
fn build_rejects_missing_input(temp_dir: TempDir) {
    let command = build_command(
        temp_dir.path().join("absent.json"),
        temp_dir.path().join("index.json"),
    );
    let err = expect_error(run_build(command), "missing input must fail");
    assert!(matches!(err, CliError::Io { .. }));
    assert_eq!(err.code(), None);
}

#[rstest]
fn build_rejects_malformed_input(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "vectors.json", r#"{"vector": [1.0]}"#)?;
    let err = match read_records(&input) {
        Ok(_) => panic!("an object is not an array of records"),
        Err(err) => err,
    };
    assert!(matches!(err, CliError::Json { .. }));
    Ok(())
}

#[rstest]
fn build_rejects_mixed_dimensions(temp_dir: TempDir) -> TestResult {
    let input = create_file(
        &temp_dir,
        "vectors.json",
        r#"[{"vector": [1.0, 0.0]}, {"vector": [1.0, 0.0, 0.0]}]"#,
    )?;
    let command = build_command(input, temp_dir.path().join("index.json"));
    let err = expect_error(run_build(command), "mixed dimensions must fail");
    assert!(matches!(
        err,
        CliError::Index(HnswError::DimensionMismatch {
            expected: 2,
            actual: 3
        })
    ));
    assert_eq!(err.code(), Some("HNSW_DIMENSION_MISMATCH"));
    Ok(())
}

#[rstest]
fn build_rejects_invalid_parameters(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "vectors.json", VECTORS)?;
    let mut command = build_command(input, temp_dir.path().join("index.json"));
    command.max_neighbours = 0;
    let err = expect_error(run_build(command), "zero max-neighbours must fail");
    assert_eq!(err.code(), Some("HNSW_INVALID_PARAMETERS"));
    Ok(())
}

#[rstest]
fn query_rejects_corrupt_snapshot(temp_dir: TempDir) -> TestResult {
    let index = create_file(&temp_dir, "index.json", "[]")?;
    let err = expect_error(
        run_query(&QueryCommand {
            index,
            vector: vec![1.0],
            k: 1,
            ef_search: None,
        }),
        "corrupt snapshot must fail",
    );
    assert!(matches!(err, CliError::Snapshot(SnapshotError::Json { .. })));
    assert_eq!(err.code(), Some("SNAPSHOT_JSON"));
    Ok(())
}

#[rstest]
fn run_cli_dispatches_parsed_arguments(temp_dir: TempDir) -> TestResult {
    let input = create_file(&temp_dir, "vectors.json", VECTORS)?
        .display()
        .to_string();
    let output = temp_dir.path().join("index.json").display().to_string();
    let build = Cli::try_parse_from([
        "simili",
        "build",
        input.as_str(),
        "--output",
        output.as_str(),
        "--max-neighbours",
        "2",
        "--ef-construction",
        "10",
    ])?;
    run_cli(build)?;

    let query = Cli::try_parse_from([
        "simili", "query", output.as_str(), "--vector", "-0.1,1.0", "-k", "2",
    ])?;
    let ExecutionSummary::Query { hits } = run_cli(query)? else {
        panic!("query must return hits");
    };
    assert_eq!(hits.first().map(|hit| hit.id), Some(1));
    Ok(())
}

#[rstest]
fn clap_requires_query_vector() {
    assert!(Cli::try_parse_from(["simili", "query", "index.json"]).is_err());
}

#[rstest]
fn clap_parses_negative_components() -> TestResult {
    let cli = Cli::try_parse_from(["simili", "query", "index.json", "--vector", "-1,0.5"])?;
    let Command::Query(query) = cli.command else {
        panic!("expected query command");
    };
    assert_eq!(query.vector, vec![-1.0, 0.5]);
    assert_eq!(query.k, 10);
    Ok(())
}

#[rstest]
fn render_summary_outputs_tab_separated_hits() -> TestResult {
    let summary = ExecutionSummary::Query {
        hits: vec![
            simili_core::Neighbour {
                id: 4,
                distance: 0.0,
            },
            simili_core::Neighbour {
                id: 2,
                distance: 0.25,
            },
        ],
    };
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    assert_eq!(String::from_utf8(buffer)?, "4\t0.000000\n2\t0.250000\n");
    Ok(())
}

#[rstest]
fn render_summary_marks_missing_values() -> TestResult {
    let summary = ExecutionSummary::Stats {
        nodes: 0,
        dimension: None,
        max_level: None,
        entry_point: None,
    };
    let mut buffer = Vec::new();
    render_summary(&summary, &mut buffer)?;
    let text = String::from_utf8(buffer)?;
    assert!(text.contains("nodes: 0"));
    assert!(text.contains("entry point: -"));
    Ok(())
}
