use super::helpers::{for_each_edge, sorted_nodes};
use super::{EvaluationMode, GraphContext, HnswInvariantViolation, helpers::LayerValidator};

pub(super) fn check_layer_consistency(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), HnswInvariantViolation> {
    let cap = ctx.params.max_level();
    for (id, node) in sorted_nodes(ctx.graph) {
        if node.level() > cap {
            mode.record(HnswInvariantViolation::LevelAboveCap {
                node: id,
                level: node.level(),
                max_level: cap,
            })?;
        }
        if node.level_count().checked_sub(1) != Some(node.level()) {
            mode.record(HnswInvariantViolation::LevelMismatch {
                node: id,
                level: node.level(),
                lists: node.level_count(),
            })?;
        }
    }

    let validator = LayerValidator::new(ctx.graph);
    for_each_edge(ctx.graph, |source, target, level| {
        match validator.ensure(source, target, level) {
            Ok(_) => Ok(()),
            Err(err) => mode.record(err),
        }
    })
}
