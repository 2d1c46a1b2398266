//! Plans HNSW insertions without mutating the graph.

use crate::hnsw::{
    error::HnswError,
    graph::{Graph, SearchContext},
    params::HnswParams,
    types::{InsertionPlan, LayerPlan, NodeId},
};

#[derive(Debug)]
pub(crate) struct InsertionPlanner<'graph> {
    graph: &'graph Graph,
}

/// Inputs required to plan an insertion.
///
/// # Examples
/// ```rust,ignore
/// use crate::hnsw::{insert::PlanningInputs, params::HnswParams};
///
/// let params = HnswParams::new(4, 8).expect("params must be valid");
/// let inputs = PlanningInputs { vector: &[1.0, 0.0], level: 0, params: &params };
/// assert_eq!(inputs.level, 0);
/// ```
#[derive(Clone, Copy, Debug)]
pub(crate) struct PlanningInputs<'a> {
    pub(crate) vector: &'a [f32],
    pub(crate) level: usize,
    pub(crate) params: &'a HnswParams,
}

impl<'graph> InsertionPlanner<'graph> {
    pub(crate) const fn new(graph: &'graph Graph) -> Self {
        Self { graph }
    }

    /// Computes the neighbours the new node will link to on every layer from
    /// `min(level, max_level)` down to 0.
    ///
    /// The returned plan lists layers from the top down. An empty graph yields
    /// an empty plan.
    pub(crate) fn plan(&self, inputs: PlanningInputs<'_>) -> Result<InsertionPlan, HnswError> {
        let PlanningInputs {
            vector,
            level,
            params,
        } = inputs;
        let Some(entry) = self.graph.entry() else {
            return Ok(InsertionPlan { layers: Vec::new() });
        };

        let searcher = self.graph.searcher();
        let mut current = entry.node;
        if entry.level > level {
            current = searcher.descend(vector, current, entry.level, level + 1)?;
        }

        let target_level = level.min(entry.level);
        let mut layers = Vec::with_capacity(target_level + 1);
        for layer in (0..=target_level).rev() {
            let (plan, closest) = self.plan_layer(vector, current, layer, params)?;
            if let Some(best) = closest {
                current = best;
            }
            layers.push(plan);
        }
        Ok(InsertionPlan { layers })
    }

    fn plan_layer(
        &self,
        vector: &[f32],
        entry: NodeId,
        level: usize,
        params: &HnswParams,
    ) -> Result<(LayerPlan, Option<NodeId>), HnswError> {
        let candidates = self.graph.searcher().search_layer(
            SearchContext {
                query: vector,
                entry,
                level,
            }
            .with_ef(params.ef_construction()),
        )?;
        let best = candidates.first().map(|neighbour| neighbour.id);
        let neighbours = self
            .graph
            .selector()
            .select_scored(candidates, params.max_neighbours())?;
        Ok((LayerPlan { level, neighbours }, best))
    }
}
