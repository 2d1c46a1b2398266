//! Text collection layered over [`HnswIndex`].
//!
//! A [`Collection`] embeds each document with a caller-supplied [`Embedder`],
//! stores the vector in the index under a fresh identifier, and keeps the
//! document payload keyed by that identifier so search results can be
//! resolved back to text.

use std::{
    collections::{BTreeMap, HashMap},
    error::Error as StdError,
};

use rand::{SeedableRng, rngs::SmallRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::{
    error::define_error_codes,
    hnsw::{HnswError, HnswIndex, HnswParams, NodeId},
    snapshot::IndexSnapshot,
};

/// Turns text into vectors of a fixed dimensionality.
pub trait Embedder {
    /// Error reported when a text cannot be embedded.
    type Error: StdError + Send + Sync + 'static;

    /// Dimensionality of every vector this embedder produces.
    fn dimension(&self) -> usize;

    /// Embeds `text`.
    ///
    /// # Errors
    /// Returns [`Self::Error`] when the text cannot be embedded.
    fn embed(&self, text: &str) -> Result<Vec<f32>, Self::Error>;
}

/// Document stored alongside its vector.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Record {
    /// Identifier shared with the index node.
    pub id: NodeId,
    /// Original document text.
    pub text: String,
    /// Free-form key/value annotations.
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// A resolved search result.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchHit {
    /// Matching document.
    pub record: Record,
    /// Cosine distance between the query and the document.
    pub distance: f32,
}

/// Serialisable image of a [`Collection`].
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct CollectionSnapshot {
    /// Snapshot of the underlying index.
    pub index: IndexSnapshot,
    /// Stored documents ordered by identifier.
    pub records: Vec<Record>,
}

/// Errors raised by [`Collection`] operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CollectionError {
    /// The embedder failed to embed a text.
    #[error("embedding failed: {source}")]
    Embedding {
        /// Error reported by the embedder.
        #[source]
        source: Box<dyn StdError + Send + Sync>,
    },
    /// The index rejected the operation.
    #[error("index operation failed: {source}")]
    Index {
        /// Underlying index error.
        #[from]
        source: HnswError,
    },
    /// A restored collection holds records without a matching node.
    #[error("record {id} has no node in the restored index")]
    OrphanRecord {
        /// Identifier of the orphaned record.
        id: NodeId,
    },
}

define_error_codes! {
    /// Stable codes describing [`CollectionError`] variants.
    enum CollectionErrorCode for CollectionError {
        /// The embedder failed to embed a text.
        Embedding => Embedding { .. } => "COLLECTION_EMBEDDING",
        /// The index rejected the operation.
        Index => Index { .. } => "COLLECTION_INDEX",
        /// A restored collection holds records without a matching node.
        OrphanRecord => OrphanRecord { .. } => "COLLECTION_ORPHAN_RECORD",
    }
}

/// Documents searchable by semantic similarity.
///
/// # Examples
/// ```
/// use std::convert::Infallible;
/// use simili_core::{Collection, Embedder, HnswParams};
///
/// struct Lengths;
///
/// impl Embedder for Lengths {
///     type Error = Infallible;
///
///     fn dimension(&self) -> usize { 2 }
///
///     fn embed(&self, text: &str) -> Result<Vec<f32>, Infallible> {
///         let vowels = text.chars().filter(|c| "aeiou".contains(*c)).count();
///         Ok(vec![1.0 + vowels as f32, text.len() as f32])
///     }
/// }
///
/// let params = HnswParams::new(4, 16).expect("params");
/// let mut collection = Collection::new(Lengths, params, 7).expect("collection");
/// let id = collection.add("banana", Default::default()).expect("add");
/// let hits = collection.search("banana", 1).expect("search");
/// assert_eq!(hits[0].record.id, id);
/// ```
#[derive(Debug)]
pub struct Collection<E> {
    embedder: E,
    index: HnswIndex,
    rng: SmallRng,
    records: HashMap<NodeId, Record>,
    ef_search: Option<usize>,
}

impl<E: Embedder> Collection<E> {
    /// Creates an empty collection whose index is fixed to the embedder's
    /// dimensionality. `seed` drives level sampling.
    ///
    /// # Errors
    /// Returns [`CollectionError::Index`] when the embedder reports a zero
    /// dimension.
    pub fn new(embedder: E, params: HnswParams, seed: u64) -> Result<Self, CollectionError> {
        let sized = params.with_dimension(embedder.dimension())?;
        Ok(Self {
            embedder,
            index: HnswIndex::new(sized),
            rng: SmallRng::seed_from_u64(seed),
            records: HashMap::new(),
            ef_search: None,
        })
    }

    /// Overrides the search breadth used by [`Collection::search`].
    #[must_use]
    pub fn with_ef_search(mut self, ef_search: usize) -> Self {
        self.ef_search = Some(ef_search);
        self
    }

    /// Embeds and stores `text`, returning its identifier.
    ///
    /// # Errors
    /// Returns [`CollectionError::Embedding`] when the embedder fails and
    /// [`CollectionError::Index`] when the index rejects the vector. The
    /// collection is unchanged on error.
    #[instrument(name = "collection.add", level = "debug", err, skip(self, text, metadata))]
    pub fn add(
        &mut self,
        text: impl Into<String>,
        metadata: BTreeMap<String, String>,
    ) -> Result<NodeId, CollectionError> {
        let document = text.into();
        let vector = self.embed(&document)?;
        let id = self.index.insert_next(vector, &mut self.rng)?;
        self.records.insert(
            id,
            Record {
                id,
                text: document,
                metadata,
            },
        );
        Ok(id)
    }

    /// Adds every text without metadata, returning the assigned identifiers
    /// in input order.
    ///
    /// # Errors
    /// Stops at the first failure; texts added before it stay in the
    /// collection.
    pub fn add_all<I, S>(&mut self, texts: I) -> Result<Vec<NodeId>, CollectionError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        texts
            .into_iter()
            .map(|text| self.add(text, BTreeMap::new()))
            .collect()
    }

    /// Returns up to `k` documents closest to `query`.
    ///
    /// Identifiers without a stored record are skipped.
    ///
    /// # Errors
    /// Returns [`CollectionError::Embedding`] when the query cannot be
    /// embedded and [`CollectionError::Index`] when the search fails.
    #[instrument(name = "collection.search", level = "debug", err, skip(self, query))]
    pub fn search(&self, query: &str, k: usize) -> Result<Vec<SearchHit>, CollectionError> {
        let vector = self.embed(query)?;
        let neighbours = self
            .index
            .find_nearest_neighbours_scored(&vector, k, self.ef_search)?;
        let hits: Vec<_> = neighbours
            .into_iter()
            .filter_map(|neighbour| {
                self.records.get(&neighbour.id).map(|record| SearchHit {
                    record: record.clone(),
                    distance: neighbour.distance,
                })
            })
            .collect();
        debug!(hits = hits.len(), "collection search finished");
        Ok(hits)
    }

    /// Looks up a stored document.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Record> {
        self.records.get(&id)
    }

    /// Number of stored documents.
    #[rustfmt::skip]
    #[must_use]
    pub fn len(&self) -> usize { self.records.len() }

    /// Returns `true` when no document has been added.
    #[rustfmt::skip]
    #[must_use]
    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Read access to the underlying index.
    #[rustfmt::skip]
    #[must_use]
    pub fn index(&self) -> &HnswIndex { &self.index }

    /// Captures the index and the stored records.
    #[must_use]
    pub fn snapshot(&self) -> CollectionSnapshot {
        let mut records: Vec<Record> = self.records.values().cloned().collect();
        records.sort_unstable_by_key(|record| record.id);
        CollectionSnapshot {
            index: self.index.snapshot(),
            records,
        }
    }

    /// Rebuilds a collection from a snapshot.
    ///
    /// # Errors
    /// Returns [`CollectionError::Index`] when the index snapshot is rejected
    /// or its dimension disagrees with the embedder, and
    /// [`CollectionError::OrphanRecord`] when a record names a missing node.
    pub fn restore(
        embedder: E,
        snapshot: CollectionSnapshot,
        seed: u64,
    ) -> Result<Self, CollectionError> {
        let index = HnswIndex::from_snapshot(snapshot.index)?;
        let expected = embedder.dimension();
        if let Some(actual) = index.dimension()
            && actual != expected
        {
            return Err(HnswError::DimensionMismatch { expected, actual }.into());
        }
        let mut records = HashMap::with_capacity(snapshot.records.len());
        for record in snapshot.records {
            if index.node(record.id).is_none() {
                return Err(CollectionError::OrphanRecord { id: record.id });
            }
            records.insert(record.id, record);
        }
        debug!(records = records.len(), "collection restored");
        Ok(Self {
            embedder,
            index,
            rng: SmallRng::seed_from_u64(seed),
            records,
            ef_search: None,
        })
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, CollectionError> {
        self.embedder
            .embed(text)
            .map_err(|source| CollectionError::Embedding {
                source: Box::new(source),
            })
    }
}
