use super::helpers::sorted_nodes;
use super::{EvaluationMode, GraphContext, HnswInvariantViolation};

pub(super) fn check_degree_bounds(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), HnswInvariantViolation> {
    let limit = ctx.params.max_neighbours();
    for (node_id, node) in sorted_nodes(ctx.graph) {
        for (level, list) in node.layers().iter().enumerate() {
            let degree = list.len();
            if degree > limit {
                mode.record(HnswInvariantViolation::DegreeBounds {
                    node: node_id,
                    layer: level,
                    degree,
                    limit,
                })?;
            }
        }
    }
    Ok(())
}
