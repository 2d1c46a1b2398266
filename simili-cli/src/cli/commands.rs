//! Command definitions and execution for the `simili` CLI.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use rand::{SeedableRng, rngs::SmallRng};
use serde::Deserialize;
use simili_core::{HnswError, HnswIndex, HnswParams, Neighbour, NodeId, SnapshotError};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

const DEFAULT_MAX_NEIGHBOURS: usize = 16;
const DEFAULT_EF_CONSTRUCTION: usize = 64;
const DEFAULT_SEED: u64 = 42;
const DEFAULT_K: usize = 10;

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(name = "simili", about = "Build and query cosine HNSW indexes.")]
pub struct Cli {
    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Build an index from a JSON array of vectors and write its snapshot.
    Build(BuildCommand),
    /// Query an index snapshot for the nearest neighbours of a vector.
    Query(QueryCommand),
    /// Summarise an index snapshot.
    Stats(StatsCommand),
}

/// Options accepted by the `build` command.
#[derive(Debug, Args, Clone)]
pub struct BuildCommand {
    /// JSON file holding `[{ "id": 0, "vector": [..] }, ..]`; `id` is optional.
    pub input: PathBuf,

    /// Destination for the index snapshot.
    #[arg(long, short)]
    pub output: PathBuf,

    /// Maximum neighbours per node and layer.
    #[arg(long = "max-neighbours", default_value_t = DEFAULT_MAX_NEIGHBOURS)]
    pub max_neighbours: usize,

    /// Candidate pool size used while inserting.
    #[arg(long = "ef-construction", default_value_t = DEFAULT_EF_CONSTRUCTION)]
    pub ef_construction: usize,

    /// Seed for level sampling.
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,
}

/// Options accepted by the `query` command.
#[derive(Debug, Args, Clone)]
pub struct QueryCommand {
    /// Index snapshot written by `build`.
    pub index: PathBuf,

    /// Comma-separated query components.
    #[arg(
        long,
        required = true,
        value_delimiter = ',',
        allow_hyphen_values = true
    )]
    pub vector: Vec<f32>,

    /// Number of neighbours to return.
    #[arg(short, default_value_t = DEFAULT_K)]
    pub k: usize,

    /// Candidate pool size used while searching; defaults to the build width.
    #[arg(long = "ef-search")]
    pub ef_search: Option<usize>,
}

/// Options accepted by the `stats` command.
#[derive(Debug, Args, Clone)]
pub struct StatsCommand {
    /// Index snapshot written by `build`.
    pub index: PathBuf,
}

/// One entry of the `build` input file.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct VectorRecord {
    /// Explicit identifier; the index assigns the next free one when absent.
    #[serde(default)]
    pub id: Option<NodeId>,
    /// Vector components.
    pub vector: Vec<f32>,
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// File I/O failed while loading an input.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The input file was not a JSON array of vector records.
    #[error("failed to parse `{path}`: {source}")]
    Json {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying parse error.
        #[source]
        source: serde_json::Error,
    },
    /// The index rejected a vector or query.
    #[error(transparent)]
    Index(#[from] HnswError),
    /// A snapshot could not be written or read.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
}

impl CliError {
    /// Returns the stable library error code behind this failure, if any.
    #[must_use]
    pub const fn code(&self) -> Option<&'static str> {
        match self {
            Self::Index(err) => Some(err.code().as_str()),
            Self::Snapshot(SnapshotError::Index { source }) => Some(source.code().as_str()),
            Self::Snapshot(err) => Some(err.code().as_str()),
            Self::Io { .. } | Self::Json { .. } => None,
        }
    }
}

/// Summarises the outcome of executing a CLI command.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecutionSummary {
    /// An index was built and written.
    Built {
        /// Number of indexed vectors.
        nodes: usize,
        /// Vector dimensionality, if any vector was indexed.
        dimension: Option<usize>,
        /// Snapshot location.
        output: PathBuf,
    },
    /// Nearest neighbours of the query, closest first.
    Query {
        /// Ranked neighbours.
        hits: Vec<Neighbour>,
    },
    /// Shape of a stored index.
    Stats {
        /// Number of indexed vectors.
        nodes: usize,
        /// Vector dimensionality, if any vector was indexed.
        dimension: Option<usize>,
        /// Highest layer of the graph.
        max_level: Option<usize>,
        /// Identifier of the entry point.
        entry_point: Option<NodeId>,
    },
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when reading inputs, indexing, or writing the
/// snapshot fails.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use simili_cli::cli::{BuildCommand, Cli, Command, ExecutionSummary, run_cli};
/// # use tempfile::TempDir;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let dir = TempDir::new()?;
/// let input = dir.path().join("vectors.json");
/// std::fs::write(&input, r#"[{"vector": [1.0, 0.0]}, {"vector": [0.0, 1.0]}]"#)?;
/// let cli = Cli {
///     command: Command::Build(BuildCommand {
///         input,
///         output: dir.path().join("index.json"),
///         max_neighbours: 4,
///         ef_construction: 16,
///         seed: 7,
///     }),
/// };
/// let summary = run_cli(cli)?;
/// assert!(matches!(summary, ExecutionSummary::Built { nodes: 2, .. }));
/// # Ok(())
/// # }
/// ```
#[instrument(name = "cli.run", err, skip(cli), fields(command = field::Empty))]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    match cli.command {
        Command::Build(build) => {
            span.record("command", field::display("build"));
            run_build(build)
        }
        Command::Query(query) => {
            span.record("command", field::display("query"));
            run_query(&query)
        }
        Command::Stats(stats) => {
            span.record("command", field::display("stats"));
            run_stats(&stats)
        }
    }
}

#[instrument(
    name = "cli.build",
    err,
    skip(command),
    fields(input = field::Empty, max_neighbours = command.max_neighbours, ef_construction = command.ef_construction),
)]
pub(super) fn run_build(command: BuildCommand) -> Result<ExecutionSummary, CliError> {
    let BuildCommand {
        input,
        output,
        max_neighbours,
        ef_construction,
        seed,
    } = command;
    Span::current().record("input", field::display(input.display()));

    let params = HnswParams::new(max_neighbours, ef_construction)?;
    let records = read_records(&input)?;
    let index = build_index(params, records, seed)?;
    index.save_json(&output)?;

    info!(
        nodes = index.len(),
        max_level = index.max_level(),
        "index build completed"
    );
    Ok(ExecutionSummary::Built {
        nodes: index.len(),
        dimension: index.dimension(),
        output,
    })
}

pub(super) fn build_index(
    params: HnswParams,
    records: Vec<VectorRecord>,
    seed: u64,
) -> Result<HnswIndex, HnswError> {
    let mut rng = SmallRng::seed_from_u64(seed);
    let mut index = HnswIndex::new(params);
    for record in records {
        match record.id {
            Some(id) => index.insert(id, record.vector, &mut rng)?,
            None => {
                index.insert_next(record.vector, &mut rng)?;
            }
        }
    }
    Ok(index)
}

#[instrument(
    name = "cli.query",
    err,
    skip(command),
    fields(index = field::Empty, k = command.k, dimension = command.vector.len()),
)]
pub(super) fn run_query(command: &QueryCommand) -> Result<ExecutionSummary, CliError> {
    Span::current().record("index", field::display(command.index.display()));
    let index = HnswIndex::load_json(&command.index)?;
    let hits = index.find_nearest_neighbours_scored(&command.vector, command.k, command.ef_search)?;
    info!(hits = hits.len(), "query completed");
    Ok(ExecutionSummary::Query { hits })
}

#[instrument(name = "cli.stats", err, skip(command), fields(index = field::Empty))]
pub(super) fn run_stats(command: &StatsCommand) -> Result<ExecutionSummary, CliError> {
    Span::current().record("index", field::display(command.index.display()));
    let index = HnswIndex::load_json(&command.index)?;
    Ok(ExecutionSummary::Stats {
        nodes: index.len(),
        dimension: index.dimension(),
        max_level: index.max_level(),
        entry_point: index.entry_point(),
    })
}

#[instrument(name = "cli.read_records", err, fields(path = field::Empty))]
pub(super) fn read_records(path: &Path) -> Result<Vec<VectorRecord>, CliError> {
    Span::current().record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Renders `summary` to `writer` in a line-oriented text format.
///
/// Query hits are printed as `id<TAB>distance`, one per line.
///
/// # Errors
/// Returns [`io::Error`] if writing to the supplied writer fails.
pub fn render_summary(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    match summary {
        ExecutionSummary::Built {
            nodes,
            dimension,
            output,
        } => {
            writeln!(writer, "nodes: {nodes}")?;
            writeln!(writer, "dimension: {}", render_optional(*dimension))?;
            writeln!(writer, "output: {}", output.display())?;
        }
        ExecutionSummary::Query { hits } => {
            for hit in hits {
                writeln!(writer, "{}\t{:.6}", hit.id, hit.distance)?;
            }
        }
        ExecutionSummary::Stats {
            nodes,
            dimension,
            max_level,
            entry_point,
        } => {
            writeln!(writer, "nodes: {nodes}")?;
            writeln!(writer, "dimension: {}", render_optional(*dimension))?;
            writeln!(writer, "max level: {}", render_optional(*max_level))?;
            writeln!(writer, "entry point: {}", render_optional(*entry_point))?;
        }
    }
    Ok(())
}

fn render_optional(value: Option<usize>) -> String {
    value.map_or_else(|| "-".to_owned(), |present| present.to_string())
}
