//! Precomputed adjacency for one solve call: Latin-square peer groups and
//! inequality edges, with relation direction normalized per endpoint.

use crate::puzzle::{Puzzle, Relation};
use crate::solver::engine::{CellId, ConstraintId};

/// One inequality constraint as seen from the cell that owns this edge: the
/// owning cell's value must satisfy `relation` against `neighbor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InequalityEdge {
    pub neighbor: CellId,
    pub relation: Relation,
    /// Index of the source constraint in [`Puzzle::constraints`].
    pub constraint: ConstraintId,
}

impl InequalityEdge {
    /// The same edge as seen from `neighbor`'s side.
    pub fn mirrored(&self, owner: CellId) -> Self {
        Self {
            neighbor: owner,
            relation: self.relation.flip(),
            constraint: self.constraint,
        }
    }
}

/// Read-only adjacency shared by both solvers.
///
/// `peers` lists, for every cell, the cells sharing its row or column (row
/// first, then column, each in ascending order). `edges` lists the
/// inequality constraints touching the cell, re-oriented so the relation
/// reads from the cell's own perspective; every constraint therefore appears
/// twice, once per endpoint.
#[derive(Debug)]
pub struct ConstraintGraph {
    peers: Vec<Vec<CellId>>,
    edges: Vec<Vec<InequalityEdge>>,
}

impl ConstraintGraph {
    pub fn build(puzzle: &Puzzle) -> Self {
        let size = puzzle.size();
        let cell_count = puzzle.cell_count();

        let mut peers = Vec::with_capacity(cell_count);
        for pos in puzzle.positions() {
            let mut cell_peers = Vec::with_capacity(2 * (size - 1));
            for col in 0..size {
                if col != pos.col {
                    cell_peers.push(pos.row * size + col);
                }
            }
            for row in 0..size {
                if row != pos.row {
                    cell_peers.push(row * size + pos.col);
                }
            }
            peers.push(cell_peers);
        }

        let mut edges: Vec<Vec<InequalityEdge>> = vec![Vec::new(); cell_count];
        for (constraint_id, constraint) in puzzle.constraints().iter().enumerate() {
            let a = puzzle.index_of(constraint.position_a);
            let b = puzzle.index_of(constraint.position_b);
            edges[a].push(InequalityEdge {
                neighbor: b,
                relation: constraint.relation,
                constraint: constraint_id,
            });
            edges[b].push(InequalityEdge {
                neighbor: a,
                relation: constraint.relation.flip(),
                constraint: constraint_id,
            });
        }

        Self { peers, edges }
    }

    pub fn peers(&self, cell: CellId) -> &[CellId] {
        &self.peers[cell]
    }

    pub fn edges(&self, cell: CellId) -> &[InequalityEdge] {
        &self.edges[cell]
    }

    /// Number of inequality constraints touching a cell.
    pub fn degree(&self, cell: CellId) -> usize {
        self.edges[cell].len()
    }
}
