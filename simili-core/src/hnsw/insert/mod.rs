//! HNSW insertion workflow.
//!
//! Planning walks the graph read-only: it descends the sparse upper layers
//! with single-width searches and then gathers and selects neighbours on each
//! layer the new node joins. Execution attaches the node, links it in both
//! directions, shrinks neighbours whose lists overflow, and promotes the entry
//! point when the node tops the hierarchy.

mod executor;
mod planner;

pub(crate) use executor::{InsertionExecutor, InsertionOutcome};
pub(crate) use planner::{InsertionPlanner, PlanningInputs};
