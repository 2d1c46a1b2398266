use super::{EvaluationMode, GraphContext, HnswInvariantViolation};

pub(super) fn check_entry_point(
    ctx: GraphContext<'_>,
    mode: &mut EvaluationMode<'_>,
) -> Result<(), HnswInvariantViolation> {
    let graph = ctx.graph;
    let max_level = graph.nodes_iter().map(|(_, node)| node.level()).max();
    match (graph.entry(), max_level) {
        (None, None) => Ok(()),
        (None, Some(_)) => mode.record(HnswInvariantViolation::MissingEntryPoint),
        (Some(entry), None) => {
            mode.record(HnswInvariantViolation::UnexpectedEntryPoint { node: entry.node })
        }
        (Some(entry), Some(max_level)) => {
            let Some(node) = graph.node(entry.node) else {
                return mode.record(HnswInvariantViolation::DanglingEntryPoint { node: entry.node });
            };
            if entry.level != max_level || node.level() != max_level {
                mode.record(HnswInvariantViolation::EntryLevelMismatch {
                    node: entry.node,
                    entry_level: entry.level,
                    max_level,
                })?;
            }
            Ok(())
        }
    }
}
