//! Strategies for choosing which unassigned cell to branch on next.

use std::cmp::Reverse;

use crate::solver::domain::DomainStore;
use crate::solver::engine::CellId;
use crate::solver::graph::ConstraintGraph;

/// A variable-selection heuristic. Implementations must be deterministic:
/// the same store and graph always yield the same choice.
pub trait VariableSelectionHeuristic {
    /// The next cell to branch on, or `None` when every cell is assigned.
    fn select(&self, store: &DomainStore, graph: &ConstraintGraph) -> Option<CellId>;
}

/// Fixed scan order: the first unassigned cell in row-major order. The basic
/// solver's selection rule.
pub struct RowMajorSelection;

impl VariableSelectionHeuristic for RowMajorSelection {
    fn select(&self, store: &DomainStore, _graph: &ConstraintGraph) -> Option<CellId> {
        store.unassigned_cells().next()
    }
}

/// Minimum Remaining Values: the unassigned cell with the smallest domain.
///
/// A fail-first strategy; tackling the most constrained cell early prunes
/// the search space fastest. Ties break to the cell touched by the most
/// unresolved inequality constraints (degree heuristic), then to row-major
/// position for determinism.
pub struct MinimumRemainingValues;

/// Inequality constraints on `cell` whose other endpoint is still open.
pub fn unresolved_degree(store: &DomainStore, graph: &ConstraintGraph, cell: CellId) -> usize {
    graph
        .edges(cell)
        .iter()
        .filter(|edge| !store.is_assigned(edge.neighbor))
        .count()
}

impl VariableSelectionHeuristic for MinimumRemainingValues {
    fn select(&self, store: &DomainStore, graph: &ConstraintGraph) -> Option<CellId> {
        store.unassigned_cells().min_by_key(|&cell| {
            (
                store.domain_len(cell),
                Reverse(unresolved_degree(store, graph, cell)),
                cell,
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::puzzle::{CellPos, InequalityConstraint, Puzzle, Relation};

    #[test]
    fn row_major_picks_first_unassigned() {
        let puzzle = Puzzle::empty(3).unwrap();
        let graph = ConstraintGraph::build(&puzzle);
        let mut store = DomainStore::new(&puzzle);
        store.assign(0, 1).unwrap();
        store.assign(1, 2).unwrap();
        assert_eq!(RowMajorSelection.select(&store, &graph), Some(2));
    }

    #[test]
    fn selection_is_none_when_complete() {
        let puzzle = Puzzle::empty(2).unwrap();
        let graph = ConstraintGraph::build(&puzzle);
        let mut store = DomainStore::new(&puzzle);
        store.assign(0, 1).unwrap();
        store.assign(1, 2).unwrap();
        store.assign(2, 2).unwrap();
        store.assign(3, 1).unwrap();
        assert_eq!(RowMajorSelection.select(&store, &graph), None);
        assert_eq!(MinimumRemainingValues.select(&store, &graph), None);
    }

    #[test]
    fn mrv_prefers_smallest_domain() {
        let puzzle = Puzzle::empty(3).unwrap();
        let graph = ConstraintGraph::build(&puzzle);
        let mut store = DomainStore::new(&puzzle);
        store.restrict(4, 1);
        store.restrict(4, 2);
        assert_eq!(MinimumRemainingValues.select(&store, &graph), Some(4));
    }

    #[test]
    fn mrv_breaks_ties_by_degree_then_position() {
        let constraints = vec![
            InequalityConstraint::new(CellPos::new(2, 0), CellPos::new(2, 1), Relation::Less),
        ];
        let puzzle = Puzzle::new(3, vec![vec![None; 3]; 3], constraints).unwrap();
        let graph = ConstraintGraph::build(&puzzle);
        let store = DomainStore::new(&puzzle);
        // All domains are size 3; cell 6 = (2, 0) carries a constraint.
        assert_eq!(MinimumRemainingValues.select(&store, &graph), Some(6));
    }

    #[test]
    fn mrv_final_tie_break_is_row_major() {
        let puzzle = Puzzle::empty(3).unwrap();
        let graph = ConstraintGraph::build(&puzzle);
        let store = DomainStore::new(&puzzle);
        assert_eq!(MinimumRemainingValues.select(&store, &graph), Some(0));
    }
}
