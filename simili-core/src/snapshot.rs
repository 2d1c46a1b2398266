//! Persistence boundary for [`HnswIndex`].
//!
//! A snapshot carries the parameters and every node with its adjacency lists.
//! `max_level` and the entry point are not stored; restoring recomputes them
//! and validates the graph before handing back an index.

use std::{
    fs::File,
    io::{self, BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    error::define_error_codes,
    hnsw::{HnswError, HnswIndex, HnswParams, Node, NodeId},
};

/// Serialisable form of [`HnswParams`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ParamsSnapshot {
    /// Per-layer degree bound `M`.
    pub max_neighbours: usize,
    /// Construction search breadth.
    pub ef_construction: usize,
    /// Factor applied when sampling node levels.
    pub level_normalization_factor: f64,
    /// Highest layer a sampled level may reach.
    pub max_level: usize,
    /// Dimensionality fixed up front, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dimension: Option<usize>,
}

impl From<&HnswParams> for ParamsSnapshot {
    fn from(params: &HnswParams) -> Self {
        Self {
            max_neighbours: params.max_neighbours(),
            ef_construction: params.ef_construction(),
            level_normalization_factor: params.level_normalization_factor(),
            max_level: params.max_level(),
            dimension: params.dimension(),
        }
    }
}

impl TryFrom<ParamsSnapshot> for HnswParams {
    type Error = HnswError;

    fn try_from(snapshot: ParamsSnapshot) -> Result<Self, Self::Error> {
        let params = Self::new(snapshot.max_neighbours, snapshot.ef_construction)?
            .with_level_normalization_factor(snapshot.level_normalization_factor)?
            .with_max_level(snapshot.max_level);
        let Some(dimension) = snapshot.dimension else {
            return Ok(params);
        };
        params.with_dimension(dimension)
    }
}

/// Serialisable form of a [`Node`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct NodeSnapshot {
    /// Node identifier.
    pub id: NodeId,
    /// Stored vector.
    pub vector: Vec<f32>,
    /// Highest layer of the node.
    pub level: usize,
    /// Neighbour lists indexed by layer.
    pub neighbours: Vec<Vec<NodeId>>,
}

impl From<&Node> for NodeSnapshot {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id(),
            vector: node.vector().to_vec(),
            level: node.level(),
            neighbours: node.layers().to_vec(),
        }
    }
}

impl From<NodeSnapshot> for Node {
    fn from(snapshot: NodeSnapshot) -> Self {
        Self::from_parts(
            snapshot.id,
            snapshot.vector,
            snapshot.level,
            snapshot.neighbours,
        )
    }
}

/// Serialisable image of an [`HnswIndex`], nodes ordered by identifier.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct IndexSnapshot {
    /// Index parameters.
    pub params: ParamsSnapshot,
    /// Dimensionality established by the index, if any.
    #[serde(default)]
    pub dimension: Option<usize>,
    /// Every node of the graph.
    pub nodes: Vec<NodeSnapshot>,
}

/// Errors raised while saving or loading snapshots.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SnapshotError {
    /// The snapshot file could not be opened, read, or written.
    #[error("snapshot I/O failed for `{path}`: {source}")]
    Io {
        /// Path of the snapshot file.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The snapshot file did not contain a valid snapshot document.
    #[error("snapshot `{path}` is not valid JSON: {source}")]
    Json {
        /// Path of the snapshot file.
        path: PathBuf,
        /// Underlying parse or encode error.
        #[source]
        source: serde_json::Error,
    },
    /// The decoded snapshot was rejected by the index.
    #[error("snapshot rejected by the index: {source}")]
    Index {
        /// Underlying index error.
        #[from]
        source: HnswError,
    },
}

define_error_codes! {
    /// Stable codes describing [`SnapshotError`] variants.
    enum SnapshotErrorCode for SnapshotError {
        /// The snapshot file could not be opened, read, or written.
        Io => Io { .. } => "SNAPSHOT_IO",
        /// The snapshot file did not contain a valid snapshot document.
        Json => Json { .. } => "SNAPSHOT_JSON",
        /// The decoded snapshot was rejected by the index.
        Index => Index { .. } => "SNAPSHOT_INDEX",
    }
}

impl IndexSnapshot {
    /// Writes the snapshot to `path` as JSON, replacing any existing file.
    ///
    /// # Errors
    /// Returns [`SnapshotError::Io`] or [`SnapshotError::Json`] when the file
    /// cannot be written.
    #[instrument(name = "snapshot.save", err, skip(self, path), fields(path = %path.as_ref().display(), nodes = self.nodes.len()))]
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        let file_path = path.as_ref();
        let io_error = |source| SnapshotError::Io {
            path: file_path.to_path_buf(),
            source,
        };
        let file = File::create(file_path).map_err(io_error)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, self).map_err(|source| SnapshotError::Json {
            path: file_path.to_path_buf(),
            source,
        })?;
        writer.flush().map_err(io_error)?;
        info!("snapshot written");
        Ok(())
    }

    /// Reads a JSON snapshot from `path`.
    ///
    /// # Errors
    /// Returns [`SnapshotError::Io`] when the file cannot be read and
    /// [`SnapshotError::Json`] when it does not decode.
    #[instrument(name = "snapshot.load", err, skip(path), fields(path = %path.as_ref().display()))]
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let file_path = path.as_ref();
        let file = File::open(file_path).map_err(|source| SnapshotError::Io {
            path: file_path.to_path_buf(),
            source,
        })?;
        let snapshot: Self = serde_json::from_reader(BufReader::new(file)).map_err(|source| {
            SnapshotError::Json {
                path: file_path.to_path_buf(),
                source,
            }
        })?;
        info!(nodes = snapshot.nodes.len(), "snapshot read");
        Ok(snapshot)
    }
}

impl HnswIndex {
    /// Captures the parameters and every node, ordered by identifier.
    #[must_use]
    pub fn snapshot(&self) -> IndexSnapshot {
        let mut nodes: Vec<NodeSnapshot> = self.nodes().map(NodeSnapshot::from).collect();
        nodes.sort_unstable_by_key(|node| node.id);
        IndexSnapshot {
            params: ParamsSnapshot::from(self.params()),
            dimension: self.dimension(),
            nodes,
        }
    }

    /// Restores an index from a snapshot, recomputing `max_level` and the
    /// entry point.
    ///
    /// # Errors
    /// Returns [`HnswError::InvalidParameters`] for unusable parameters,
    /// [`HnswError::DimensionMismatch`] when the recorded dimension disagrees
    /// with the stored vectors, and the errors of [`HnswIndex::from_nodes`].
    pub fn from_snapshot(snapshot: IndexSnapshot) -> Result<Self, HnswError> {
        let IndexSnapshot {
            params,
            dimension,
            nodes,
        } = snapshot;
        let index = Self::from_nodes(
            HnswParams::try_from(params)?,
            nodes.into_iter().map(Node::from),
        )?;
        if let (Some(expected), Some(actual)) = (dimension, index.dimension())
            && expected != actual
        {
            return Err(HnswError::DimensionMismatch { expected, actual });
        }
        Ok(index)
    }

    /// Writes [`HnswIndex::snapshot`] to `path` as JSON.
    ///
    /// # Errors
    /// See [`IndexSnapshot::save_json`].
    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), SnapshotError> {
        self.snapshot().save_json(path)
    }

    /// Loads and restores an index from a JSON snapshot at `path`.
    ///
    /// # Errors
    /// See [`IndexSnapshot::load_json`] and [`HnswIndex::from_snapshot`].
    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, SnapshotError> {
        let snapshot = IndexSnapshot::load_json(path)?;
        Ok(Self::from_snapshot(snapshot)?)
    }
}
