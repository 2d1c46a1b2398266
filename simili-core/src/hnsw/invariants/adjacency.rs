use std::collections::HashSet;

use super::helpers::sorted_nodes;
use super::{EvaluationMode, GraphContext, HnswInvariantViolation};

pub(super) fn check_adjacency_hygiene(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), HnswInvariantViolation> {
    let mut seen = HashSet::new();
    for (node_id, node) in sorted_nodes(ctx.graph) {
        for (layer, list) in node.layers().iter().enumerate() {
            seen.clear();
            for &neighbour in list {
                if neighbour == node_id {
                    mode.record(HnswInvariantViolation::SelfLoop {
                        node: node_id,
                        layer,
                    })?;
                } else if !seen.insert(neighbour) {
                    mode.record(HnswInvariantViolation::DuplicateNeighbour {
                        node: node_id,
                        neighbour,
                        layer,
                    })?;
                }
            }
        }
    }
    Ok(())
}
