//! Strategies for ordering the candidate values of the cell being branched
//! on.

use crate::puzzle::CellValue;
use crate::solver::domain::DomainStore;
use crate::solver::engine::CellId;
use crate::solver::graph::ConstraintGraph;

/// A value-ordering heuristic. The returned values are drawn from the cell's
/// current domain; order must be deterministic.
pub trait ValueOrderingHeuristic {
    fn order(&self, cell: CellId, store: &DomainStore, graph: &ConstraintGraph) -> Vec<CellValue>;
}

/// Natural ascending order. The basic solver's trial order.
pub struct AscendingValues;

impl ValueOrderingHeuristic for AscendingValues {
    fn order(&self, cell: CellId, store: &DomainStore, _graph: &ConstraintGraph) -> Vec<CellValue> {
        store.domain(cell).iter().copied().collect()
    }
}

/// Least Constraining Value: candidates ordered by how many options they
/// would remove from open neighbor domains if chosen, fewest first. Ties
/// break to the smaller value.
pub struct LeastConstrainingValue;

/// Candidate options `value` at `cell` would eliminate: one per open
/// row/column peer still holding `value`, plus every neighbor candidate an
/// inequality with `cell` would rule out.
pub fn elimination_count(
    cell: CellId,
    value: CellValue,
    store: &DomainStore,
    graph: &ConstraintGraph,
) -> usize {
    let mut eliminated = 0;
    for &peer in graph.peers(cell) {
        if !store.is_assigned(peer) && store.domain(peer).contains(&value) {
            eliminated += 1;
        }
    }
    for edge in graph.edges(cell) {
        if store.is_assigned(edge.neighbor) {
            continue;
        }
        eliminated += store
            .domain(edge.neighbor)
            .iter()
            .filter(|&&neighbor_value| !edge.relation.holds(value, neighbor_value))
            .count();
    }
    eliminated
}

impl ValueOrderingHeuristic for LeastConstrainingValue {
    fn order(&self, cell: CellId, store: &DomainStore, graph: &ConstraintGraph) -> Vec<CellValue> {
        let mut scored: Vec<(usize, CellValue)> = store
            .domain(cell)
            .iter()
            .map(|&value| (elimination_count(cell, value, store, graph), value))
            .collect();
        scored.sort_by_key(|&(score, value)| (score, value));
        scored.into_iter().map(|(_, value)| value).collect()
    }
}
