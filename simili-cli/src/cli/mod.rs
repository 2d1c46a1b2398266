//! Command-line interface for building and querying Simili indexes.
//!
//! `build` turns a JSON array of vectors into an index snapshot, `query`
//! searches a snapshot, and `stats` summarises one.

mod commands;

pub use commands::{
    BuildCommand, Cli, CliError, Command, ExecutionSummary, QueryCommand, StatsCommand,
    VectorRecord, render_summary, run_cli,
};

#[cfg(test)]
mod tests;
