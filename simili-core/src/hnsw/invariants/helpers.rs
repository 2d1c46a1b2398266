use crate::hnsw::{graph::Graph, node::Node, types::NodeId};

use super::{HnswInvariantViolation, LayerConsistencyDetail};

/// Returns the graph's nodes ordered by identifier so reports are stable.
pub(super) fn sorted_nodes(graph: &Graph) -> Vec<(NodeId, &Node)> {
    let mut nodes: Vec<_> = graph.nodes_iter().collect();
    nodes.sort_unstable_by_key(|(id, _)| *id);
    nodes
}

pub(super) fn for_each_edge(
    graph: &Graph,
    mut visitor: impl FnMut(NodeId, NodeId, usize) -> Result<(), HnswInvariantViolation>,
) -> Result<(), HnswInvariantViolation> {
    for (source, node) in sorted_nodes(graph) {
        for (level, target) in node.iter_neighbours() {
            visitor(source, target, level)?;
        }
    }
    Ok(())
}

#[derive(Clone, Copy, Debug)]
pub(super) struct LayerValidator<'a> {
    graph: &'a Graph,
}

impl<'a> LayerValidator<'a> {
    pub(super) const fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    pub(super) fn ensure(
        &self,
        origin: NodeId,
        target: NodeId,
        layer: usize,
    ) -> Result<&'a Node, HnswInvariantViolation> {
        let node = self
            .graph
            .node(target)
            .ok_or(HnswInvariantViolation::LayerConsistency {
                origin,
                target,
                layer,
                detail: LayerConsistencyDetail::MissingNode,
            })?;
        if node.level() < layer || node.level_count() <= layer {
            return Err(HnswInvariantViolation::LayerConsistency {
                origin,
                target,
                layer,
                detail: LayerConsistencyDetail::MissingLayer {
                    available: node.level_count(),
                },
            });
        }
        Ok(node)
    }
}
