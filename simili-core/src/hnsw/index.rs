//! Public HNSW index API driving insertion, search, and invariant checking.

use rand::Rng;
use tracing::{debug, instrument};

use super::{
    error::HnswError,
    graph::{Graph, SearchContext},
    insert::{InsertionOutcome, PlanningInputs},
    invariants::HnswInvariantChecker,
    level::sample_capped_level,
    node::Node,
    params::HnswParams,
    types::{Neighbour, NodeId},
    validate::validate_vector,
};

/// Approximate nearest-neighbour index over cosine distance.
///
/// Mutation requires `&mut self` and queries take `&self`, so an index shared
/// across threads needs an external lock around inserts.
///
/// # Examples
/// ```
/// use rand::{SeedableRng, rngs::SmallRng};
/// use simili_core::{HnswIndex, HnswParams};
///
/// let mut rng = SmallRng::seed_from_u64(7);
/// let mut index = HnswIndex::new(HnswParams::new(2, 10).expect("params"));
/// index.insert(0, vec![1.0, 0.0], &mut rng).expect("insert");
/// index.insert(1, vec![0.0, 1.0], &mut rng).expect("insert");
/// index.insert(2, vec![0.9, 0.1], &mut rng).expect("insert");
///
/// let nearest = index
///     .find_nearest_neighbours(&[1.0, 0.0], 1, None)
///     .expect("search");
/// assert_eq!(nearest, vec![0]);
/// ```
#[derive(Clone, Debug)]
pub struct HnswIndex {
    params: HnswParams,
    pub(super) graph: Graph,
    next_id: NodeId,
}

impl HnswIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new(params: HnswParams) -> Self {
        let graph = Graph::new(params.dimension());
        Self {
            params,
            graph,
            next_id: 0,
        }
    }

    /// Restores an index from a pre-populated node collection.
    ///
    /// `max_level` and the entry point are derived from the nodes: the entry
    /// point is the lowest identifier among the nodes on the highest layer.
    /// The dimension is taken from the parameters or, failing that, from the
    /// first node.
    ///
    /// # Errors
    /// Returns [`HnswError::DuplicateNode`] when two nodes share an identifier,
    /// a vector validation error when a stored vector is empty, non-finite or
    /// of the wrong dimension, and [`HnswError::InvalidSnapshot`] when the
    /// assembled graph violates a structural invariant.
    pub fn from_nodes(
        params: HnswParams,
        nodes: impl IntoIterator<Item = Node>,
    ) -> Result<Self, HnswError> {
        let graph = Graph::restore(params.dimension(), nodes)?;
        for (_, node) in graph.nodes_iter() {
            validate_vector(node.vector(), graph.dimension())?;
        }
        let next_id = graph
            .nodes_iter()
            .map(|(id, _)| id)
            .max()
            .map_or(0, |id| id + 1);
        let index = Self {
            params,
            graph,
            next_id,
        };
        index.invariants().check_all()?;
        debug!(
            nodes = index.len(),
            max_level = ?index.max_level(),
            entry = ?index.entry_point(),
            "restored HNSW index"
        );
        Ok(index)
    }

    /// Inserts `vector` under the caller-supplied identifier `id`.
    ///
    /// The first node of an empty index lands on layer 0 and becomes the entry
    /// point. Later nodes draw their level from `rng`.
    ///
    /// # Errors
    /// Returns [`HnswError::DuplicateNode`] when `id` is already present (the
    /// index is left unchanged), [`HnswError::DimensionMismatch`] when the
    /// vector disagrees with the index dimensionality, and
    /// [`HnswError::EmptyVector`] or [`HnswError::NonFiniteComponent`] for
    /// vectors that cannot be compared.
    #[instrument(
        name = "hnsw.insert",
        level = "debug",
        err,
        skip(self, vector, rng),
        fields(dimension = vector.len())
    )]
    pub fn insert<R: Rng + ?Sized>(
        &mut self,
        id: NodeId,
        vector: Vec<f32>,
        rng: &mut R,
    ) -> Result<(), HnswError> {
        validate_vector(&vector, self.graph.dimension())?;
        if self.graph.contains(id) {
            return Err(HnswError::DuplicateNode { node: id });
        }

        let level = if self.graph.is_empty() {
            0
        } else {
            sample_capped_level(
                self.params.level_normalization_factor(),
                self.params.max_level(),
                rng,
            )
        };

        let plan = self.graph.insertion_planner().plan(PlanningInputs {
            vector: &vector,
            level,
            params: &self.params,
        })?;
        let outcome = self.graph.insertion_executor().apply(
            Node::new(id, vector, level),
            plan,
            self.params.max_neighbours(),
        )?;
        self.next_id = self.next_id.max(id.saturating_add(1));
        debug!(
            level,
            links = outcome.links,
            shrinks = outcome.shrinks,
            promoted = outcome.promoted,
            "inserted node"
        );
        record_insert(outcome);
        Ok(())
    }

    /// Inserts `vector` under the next identifier from the index-owned
    /// counter and returns that identifier.
    ///
    /// The counter starts at zero and always exceeds every identifier present
    /// in the index.
    ///
    /// # Errors
    /// Propagates the validation errors of [`HnswIndex::insert`].
    pub fn insert_next<R: Rng + ?Sized>(
        &mut self,
        vector: Vec<f32>,
        rng: &mut R,
    ) -> Result<NodeId, HnswError> {
        let id = self.next_id;
        self.insert(id, vector, rng)?;
        Ok(id)
    }

    /// Returns up to `k` node identifiers ordered by ascending distance to
    /// `query`.
    ///
    /// `ef_search` defaults to the construction width. An empty index yields
    /// an empty result.
    ///
    /// # Errors
    /// Returns a vector validation error when `query` is empty, non-finite or
    /// of the wrong dimension.
    pub fn find_nearest_neighbours(
        &self,
        query: &[f32],
        k: usize,
        ef_search: Option<usize>,
    ) -> Result<Vec<NodeId>, HnswError> {
        let neighbours = self.find_nearest_neighbours_scored(query, k, ef_search)?;
        Ok(neighbours.into_iter().map(|neighbour| neighbour.id).collect())
    }

    /// Like [`HnswIndex::find_nearest_neighbours`] but keeps the distance of
    /// each result.
    ///
    /// # Errors
    /// Returns a vector validation error when `query` is empty, non-finite or
    /// of the wrong dimension.
    #[instrument(
        name = "hnsw.search",
        level = "trace",
        err,
        skip(self, query),
        fields(dimension = query.len())
    )]
    pub fn find_nearest_neighbours_scored(
        &self,
        query: &[f32],
        k: usize,
        ef_search: Option<usize>,
    ) -> Result<Vec<Neighbour>, HnswError> {
        validate_vector(query, self.graph.dimension())?;
        let Some(entry) = self.graph.entry() else {
            return Ok(Vec::new());
        };
        if k == 0 {
            return Ok(Vec::new());
        }
        record_search();

        let ef = ef_search.unwrap_or(self.params.ef_construction());
        let searcher = self.graph.searcher();
        let current = if entry.level > 0 {
            searcher.descend(query, entry.node, entry.level, 1)?
        } else {
            entry.node
        };
        let mut neighbours = searcher.search_layer(
            SearchContext {
                query,
                entry: current,
                level: 0,
            }
            .with_ef(ef),
        )?;
        neighbours.truncate(k);
        Ok(neighbours)
    }

    /// Runs a single bounded best-first search on `layer`, starting at
    /// `entry`, and returns up to `ef` identifiers closest first.
    ///
    /// Nodes without a list on `layer` contribute no neighbours; an `ef` of
    /// zero is treated as one.
    ///
    /// # Errors
    /// Returns [`HnswError::UnknownNode`] when `entry` is not in the index and
    /// a vector validation error for an unusable `query`.
    pub fn search_layer(
        &self,
        query: &[f32],
        entry: NodeId,
        layer: usize,
        ef: usize,
    ) -> Result<Vec<NodeId>, HnswError> {
        validate_vector(query, self.graph.dimension())?;
        let neighbours = self.graph.searcher().search_layer(
            SearchContext {
                query,
                entry,
                level: layer,
            }
            .with_ef(ef),
        )?;
        Ok(neighbours.into_iter().map(|neighbour| neighbour.id).collect())
    }

    /// Picks at most `max_count` of `candidates` for linking to `query`.
    ///
    /// A candidate is first accepted only when it is strictly closer to the
    /// query than to every candidate already accepted. Remaining slots are
    /// then filled with the closest unselected candidates. Diverse picks come
    /// first in the output, followed by the fill-ins.
    ///
    /// # Errors
    /// Returns [`HnswError::UnknownNode`] when a candidate is not in the index
    /// and a vector validation error for an unusable `query`.
    ///
    /// # Examples
    /// ```
    /// use rand::{SeedableRng, rngs::SmallRng};
    /// use simili_core::{HnswIndex, HnswParams};
    ///
    /// let mut rng = SmallRng::seed_from_u64(1);
    /// let mut index = HnswIndex::new(HnswParams::new(4, 8).expect("params"));
    /// index.insert(0, vec![1.0, 0.1], &mut rng).expect("insert");
    /// index.insert(1, vec![1.0, 0.11], &mut rng).expect("insert");
    /// index.insert(2, vec![1.0, -0.5], &mut rng).expect("insert");
    ///
    /// let picked = index
    ///     .select_neighbours(&[1.0, 0.0], &[0, 1, 2], 2)
    ///     .expect("selection");
    /// assert_eq!(picked, vec![0, 2]);
    /// ```
    pub fn select_neighbours(
        &self,
        query: &[f32],
        candidates: &[NodeId],
        max_count: usize,
    ) -> Result<Vec<NodeId>, HnswError> {
        validate_vector(query, self.graph.dimension())?;
        self.graph.selector().select(query, candidates, max_count)
    }

    /// Re-selects the neighbours of `node` on `layer` when the list holds
    /// more than `max_neighbours` entries. Returns whether the list changed.
    ///
    /// # Errors
    /// Returns [`HnswError::UnknownNode`] when `node` or one of its listed
    /// neighbours is not in the index.
    pub fn shrink_connections(&mut self, node: NodeId, layer: usize) -> Result<bool, HnswError> {
        self.graph
            .shrink_connections(node, layer, self.params.max_neighbours())
    }

    /// Returns a handle for checking structural invariants.
    #[must_use]
    pub fn invariants(&self) -> HnswInvariantChecker<'_> {
        HnswInvariantChecker::new(self)
    }

    /// Returns the number of stored nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn len(&self) -> usize { self.graph.len() }

    /// Returns whether the index stores no nodes.
    #[must_use]
    #[rustfmt::skip]
    pub fn is_empty(&self) -> bool { self.graph.is_empty() }

    /// Returns the parameters the index was built with.
    #[must_use]
    #[rustfmt::skip]
    pub const fn params(&self) -> &HnswParams { &self.params }

    /// Returns the vector dimensionality, once established.
    #[must_use]
    #[rustfmt::skip]
    pub fn dimension(&self) -> Option<usize> { self.graph.dimension() }

    /// Returns the highest layer in the graph, or `None` when empty.
    #[must_use]
    pub fn max_level(&self) -> Option<usize> {
        self.graph.entry().map(|entry| entry.level)
    }

    /// Returns the identifier of the entry point, or `None` when empty.
    #[must_use]
    pub fn entry_point(&self) -> Option<NodeId> {
        self.graph.entry().map(|entry| entry.node)
    }

    /// Returns the identifier the next call to [`HnswIndex::insert_next`]
    /// will use.
    #[must_use]
    #[rustfmt::skip]
    pub const fn next_id(&self) -> NodeId { self.next_id }

    /// Looks up a node by identifier.
    #[must_use]
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.graph.node(id)
    }

    /// Iterates over every node in unspecified order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.nodes_iter().map(|(_, node)| node)
    }

    /// Consumes the index and returns its nodes in unspecified order.
    pub fn into_nodes(self) -> impl Iterator<Item = Node> {
        self.graph.into_nodes()
    }
}

#[cfg(feature = "metrics")]
fn record_insert(outcome: InsertionOutcome) {
    metrics::counter!("simili_hnsw_inserts_total").increment(1);
    metrics::counter!("simili_hnsw_shrinks_total")
        .increment(u64::try_from(outcome.shrinks).unwrap_or(u64::MAX));
}

#[cfg(not(feature = "metrics"))]
const fn record_insert(_outcome: InsertionOutcome) {}

#[cfg(feature = "metrics")]
fn record_search() {
    metrics::counter!("simili_hnsw_searches_total").increment(1);
}

#[cfg(not(feature = "metrics"))]
const fn record_search() {}
