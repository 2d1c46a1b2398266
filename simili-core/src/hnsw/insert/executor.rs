//! Applies planned HNSW insertions by mutating the graph.

use tracing::trace;

use crate::hnsw::{
    error::HnswError,
    graph::Graph,
    node::Node,
    types::{InsertionPlan, NodeId},
};

/// Summary of the graph mutations performed for one insertion.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct InsertionOutcome {
    pub(crate) links: usize,
    pub(crate) shrinks: usize,
    pub(crate) promoted: bool,
}

#[derive(Debug)]
pub(crate) struct InsertionExecutor<'graph> {
    graph: &'graph mut Graph,
}

impl<'graph> InsertionExecutor<'graph> {
    pub(crate) const fn new(graph: &'graph mut Graph) -> Self {
        Self { graph }
    }

    /// Attaches `node` with the planned neighbour lists, adds the reverse
    /// links, and shrinks every neighbour whose list now exceeds
    /// `max_neighbours`.
    pub(crate) fn apply(
        &mut self,
        mut node: Node,
        plan: InsertionPlan,
        max_neighbours: usize,
    ) -> Result<InsertionOutcome, HnswError> {
        let id = node.id();
        let level = node.level();
        if self.graph.contains(id) {
            return Err(HnswError::DuplicateNode { node: id });
        }
        if self.graph.is_empty() {
            self.graph.insert_first(node)?;
            return Ok(InsertionOutcome {
                promoted: true,
                ..InsertionOutcome::default()
            });
        }

        for layer in &plan.layers {
            let list = node
                .neighbours_mut(layer.level)
                .ok_or_else(|| HnswError::GraphInvariantViolation {
                    message: format!(
                        "planned layer {} exceeds level {level} of node {id}",
                        layer.level
                    ),
                })?;
            list.clone_from(&layer.neighbours);
        }
        self.graph.attach_node(node)?;

        let mut outcome = InsertionOutcome::default();
        for layer in plan.layers {
            for neighbour in layer.neighbours {
                self.link_back(neighbour, id, layer.level)?;
                outcome.links += 1;
                if self
                    .graph
                    .shrink_connections(neighbour, layer.level, max_neighbours)?
                {
                    outcome.shrinks += 1;
                }
            }
        }

        let previous = self.graph.entry().map(|entry| entry.level);
        self.graph.promote_entry(id, level);
        outcome.promoted = previous.is_some_and(|top| level > top);
        Ok(outcome)
    }

    fn link_back(&mut self, from: NodeId, to: NodeId, level: usize) -> Result<(), HnswError> {
        let list = self
            .graph
            .node_mut(from)
            .and_then(|node| node.neighbours_mut(level))
            .ok_or_else(|| HnswError::GraphInvariantViolation {
                message: format!("node {from} has no list at layer {level} to link {to}"),
            })?;
        if !list.contains(&to) {
            list.push(to);
            trace!(from, to, level, "linked neighbour");
        }
        Ok(())
    }
}
