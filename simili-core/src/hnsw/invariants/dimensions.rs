use super::helpers::sorted_nodes;
use super::{EvaluationMode, GraphContext, HnswInvariantViolation};

pub(super) fn check_dimensions(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), HnswInvariantViolation> {
    let Some(expected) = ctx.graph.dimension() else {
        return Ok(());
    };
    for (node_id, node) in sorted_nodes(ctx.graph) {
        let actual = node.vector().len();
        if actual != expected {
            mode.record(HnswInvariantViolation::DimensionMismatch {
                node: node_id,
                expected,
                actual,
            })?;
        }
    }
    Ok(())
}
