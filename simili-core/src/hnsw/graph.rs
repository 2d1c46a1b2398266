//! Internal graph representation for the HNSW index.

use std::collections::HashMap;

use tracing::debug;

use crate::hnsw::{
    error::HnswError,
    insert::{InsertionExecutor, InsertionPlanner},
    node::Node,
    search::LayerSearcher,
    select::NeighbourSelector,
    types::{EntryPoint, NodeId},
};

/// Query, starting node, and layer of a single layer search.
#[derive(Clone, Copy, Debug)]
pub(crate) struct SearchContext<'q> {
    pub(crate) query: &'q [f32],
    pub(crate) entry: NodeId,
    pub(crate) level: usize,
}

impl<'q> SearchContext<'q> {
    #[must_use]
    #[inline]
    pub(crate) const fn with_ef(self, ef: usize) -> ExtendedSearchContext<'q> {
        ExtendedSearchContext { base: self, ef }
    }

    #[inline]
    pub(crate) const fn query(&self) -> &'q [f32] {
        self.query
    }

    #[inline]
    pub(crate) const fn entry(&self) -> NodeId {
        self.entry
    }

    #[inline]
    pub(crate) const fn level(&self) -> usize {
        self.level
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct ExtendedSearchContext<'q> {
    pub(crate) base: SearchContext<'q>,
    pub(crate) ef: usize,
}

impl<'q> ExtendedSearchContext<'q> {
    #[inline]
    pub(crate) const fn query(&self) -> &'q [f32] {
        self.base.query()
    }

    #[inline]
    pub(crate) const fn entry(&self) -> NodeId {
        self.base.entry()
    }

    #[inline]
    pub(crate) const fn level(&self) -> usize {
        self.base.level()
    }

    /// Search width with `ef == 0` widened to one.
    #[inline]
    pub(crate) fn ef(&self) -> usize {
        self.ef.max(1)
    }
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Graph {
    nodes: HashMap<NodeId, Node>,
    entry: Option<EntryPoint>,
    dimension: Option<usize>,
}

impl Graph {
    #[must_use]
    pub(crate) fn new(dimension: Option<usize>) -> Self {
        Self {
            nodes: HashMap::new(),
            entry: None,
            dimension,
        }
    }

    /// Rebuilds a graph from a pre-populated node collection.
    ///
    /// The entry point is the lowest identifier among the nodes on the highest
    /// layer. Under monotonic identifier allocation that is the first node to
    /// reach the layer, which is the one promotion would have kept.
    pub(crate) fn restore(
        dimension: Option<usize>,
        nodes: impl IntoIterator<Item = Node>,
    ) -> Result<Self, HnswError> {
        let mut graph = Self::new(dimension);
        for node in nodes {
            let id = node.id();
            if graph.dimension.is_none() {
                graph.dimension = Some(node.vector().len());
            }
            if graph.nodes.insert(id, node).is_some() {
                return Err(HnswError::DuplicateNode { node: id });
            }
        }
        graph.entry = graph
            .nodes
            .values()
            .map(|node| EntryPoint {
                node: node.id(),
                level: node.level(),
            })
            .min_by(|a, b| b.level.cmp(&a.level).then(a.node.cmp(&b.node)));
        Ok(graph)
    }

    #[rustfmt::skip]
    pub(crate) const fn entry(&self) -> Option<EntryPoint> { self.entry }

    #[rustfmt::skip]
    pub(crate) const fn dimension(&self) -> Option<usize> { self.dimension }

    #[rustfmt::skip]
    pub(crate) fn len(&self) -> usize { self.nodes.len() }

    #[rustfmt::skip]
    pub(crate) fn is_empty(&self) -> bool { self.nodes.is_empty() }

    #[rustfmt::skip]
    pub(crate) fn contains(&self, id: NodeId) -> bool { self.nodes.contains_key(&id) }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Iterates over all nodes in unspecified order.
    pub(crate) fn nodes_iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().map(|(&id, node)| (id, node))
    }

    pub(crate) fn into_nodes(self) -> impl Iterator<Item = Node> {
        self.nodes.into_values()
    }

    /// Stores the first node of an empty graph and makes it the entry point.
    pub(crate) fn insert_first(&mut self, node: Node) -> Result<(), HnswError> {
        let entry = EntryPoint {
            node: node.id(),
            level: node.level(),
        };
        self.attach_node(node)?;
        self.entry = Some(entry);
        Ok(())
    }

    pub(crate) fn attach_node(&mut self, node: Node) -> Result<(), HnswError> {
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(HnswError::DuplicateNode { node: id });
        }
        if self.dimension.is_none() {
            self.dimension = Some(node.vector().len());
        }
        self.nodes.insert(id, node);
        Ok(())
    }

    pub(crate) fn promote_entry(&mut self, node: NodeId, level: usize) {
        let current_level = self.entry.map_or(0, |entry| entry.level);
        if self.entry.is_none() || level > current_level {
            debug!(node, level, previous = current_level, "promoting entry point");
            self.entry = Some(EntryPoint { node, level });
        }
    }

    #[inline]
    pub(crate) fn insertion_planner(&self) -> InsertionPlanner<'_> {
        InsertionPlanner::new(self)
    }

    #[inline]
    pub(crate) fn insertion_executor(&mut self) -> InsertionExecutor<'_> {
        InsertionExecutor::new(self)
    }

    #[inline]
    pub(crate) fn searcher(&self) -> LayerSearcher<'_> {
        LayerSearcher::new(self)
    }

    #[inline]
    pub(crate) fn selector(&self) -> NeighbourSelector<'_> {
        NeighbourSelector::new(self)
    }

    /// Re-selects the neighbours of `id` at `level` when the list exceeds
    /// `max_neighbours`. Returns whether the list was replaced.
    pub(crate) fn shrink_connections(
        &mut self,
        id: NodeId,
        level: usize,
        max_neighbours: usize,
    ) -> Result<bool, HnswError> {
        let node = self.node(id).ok_or(HnswError::UnknownNode { node: id })?;
        let current = node.neighbours(level);
        if current.len() <= max_neighbours {
            return Ok(false);
        }
        let before = current.len();
        let selected = self
            .selector()
            .select(node.vector(), current, max_neighbours)?;
        let list = self
            .node_mut(id)
            .and_then(|owner| owner.neighbours_mut(level))
            .ok_or_else(|| HnswError::GraphInvariantViolation {
                message: format!("node {id} lost layer {level} while shrinking"),
            })?;
        *list = selected;
        debug!(node = id, level, before, after = list.len(), "shrunk neighbour list");
        Ok(true)
    }
}
