//! The immutable description of a Futoshiki instance: grid size, prefilled
//! cells, and the set of pairwise inequality constraints.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;

/// A value placed in a cell, always in `1..=N` for an `N`x`N` puzzle.
pub type CellValue = u32;

/// A zero-based (row, column) grid coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellPos {
    pub row: usize,
    pub col: usize,
}

impl CellPos {
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for CellPos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// The direction of an inequality between two cells, read as
/// "value at A is strictly `Relation` than value at B".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    Greater,
    Less,
}

impl Relation {
    /// The same logical relation seen from the opposite endpoint.
    pub fn flip(self) -> Self {
        match self {
            Relation::Greater => Relation::Less,
            Relation::Less => Relation::Greater,
        }
    }

    /// Whether `a Relation b` holds for concrete values.
    pub fn holds(self, a: CellValue, b: CellValue) -> bool {
        match self {
            Relation::Greater => a > b,
            Relation::Less => a < b,
        }
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Relation::Greater => write!(f, ">"),
            Relation::Less => write!(f, "<"),
        }
    }
}

/// One inequality constraint between two distinct cells.
///
/// Storage keeps the authored orientation; `oriented_from` answers a lookup
/// from either endpoint with the relation re-expressed for that endpoint, so
/// `(A, B, Greater)` and a query from `B` agree on the same logical
/// constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InequalityConstraint {
    pub position_a: CellPos,
    pub position_b: CellPos,
    pub relation: Relation,
}

impl InequalityConstraint {
    pub fn new(position_a: CellPos, position_b: CellPos, relation: Relation) -> Self {
        Self {
            position_a,
            position_b,
            relation,
        }
    }

    pub fn involves(&self, pos: CellPos) -> bool {
        self.position_a == pos || self.position_b == pos
    }

    /// Whether the constraint holds for the concrete endpoint values.
    pub fn holds(&self, value_a: CellValue, value_b: CellValue) -> bool {
        self.relation.holds(value_a, value_b)
    }

    /// The other endpoint and the relation `pos` must satisfy against it, or
    /// `None` when `pos` is not an endpoint of this constraint.
    pub fn oriented_from(&self, pos: CellPos) -> Option<(CellPos, Relation)> {
        if pos == self.position_a {
            Some((self.position_b, self.relation))
        } else if pos == self.position_b {
            Some((self.position_a, self.relation.flip()))
        } else {
            None
        }
    }
}

/// An immutable Futoshiki instance.
///
/// Construction validates shape only: grid dimensions, value ranges, and
/// constraint endpoints. Whether the givens are mutually consistent is left
/// to the solvers, which report contradictions as unsatisfiable rather than
/// as construction errors.
#[derive(Debug, Clone)]
pub struct Puzzle {
    size: usize,
    givens: Vec<Option<CellValue>>,
    constraints: Vec<InequalityConstraint>,
}

impl Puzzle {
    pub fn new(
        size: usize,
        grid: Vec<Vec<Option<CellValue>>>,
        constraints: Vec<InequalityConstraint>,
    ) -> Result<Self, PuzzleError> {
        if size < 2 {
            return Err(PuzzleError::SizeTooSmall { size });
        }
        if grid.len() != size {
            return Err(PuzzleError::WrongRowCount {
                expected: size,
                actual: grid.len(),
            });
        }
        let mut givens = Vec::with_capacity(size * size);
        for (row, cells) in grid.into_iter().enumerate() {
            if cells.len() != size {
                return Err(PuzzleError::WrongRowLength {
                    row,
                    expected: size,
                    actual: cells.len(),
                });
            }
            for (col, cell) in cells.into_iter().enumerate() {
                if let Some(value) = cell {
                    if value < 1 || value as usize > size {
                        return Err(PuzzleError::ValueOutOfRange {
                            row,
                            col,
                            value,
                            size,
                        });
                    }
                }
                givens.push(cell);
            }
        }
        for constraint in &constraints {
            for pos in [constraint.position_a, constraint.position_b] {
                if pos.row >= size || pos.col >= size {
                    return Err(PuzzleError::CellOutOfBounds {
                        row: pos.row,
                        col: pos.col,
                        size,
                    });
                }
            }
            if constraint.position_a == constraint.position_b {
                return Err(PuzzleError::SelfReference {
                    row: constraint.position_a.row,
                    col: constraint.position_a.col,
                });
            }
        }
        Ok(Self {
            size,
            givens,
            constraints,
        })
    }

    /// An `N`x`N` puzzle with no givens and no constraints.
    pub fn empty(size: usize) -> Result<Self, PuzzleError> {
        Self::new(size, vec![vec![None; size]; size], Vec::new())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.size * self.size
    }

    pub fn constraints(&self) -> &[InequalityConstraint] {
        &self.constraints
    }

    pub fn given(&self, pos: CellPos) -> Option<CellValue> {
        self.givens[self.index_of(pos)]
    }

    /// Prefilled cells in row-major order.
    pub fn givens(&self) -> impl Iterator<Item = (CellPos, CellValue)> + '_ {
        self.givens
            .iter()
            .enumerate()
            .filter_map(|(id, value)| value.map(|v| (self.pos_of(id), v)))
    }

    /// All cell positions in row-major order.
    pub fn positions(&self) -> impl Iterator<Item = CellPos> + '_ {
        let size = self.size;
        (0..size).flat_map(move |row| (0..size).map(move |col| CellPos::new(row, col)))
    }

    /// Row-major index of a position.
    pub fn index_of(&self, pos: CellPos) -> usize {
        pos.row * self.size + pos.col
    }

    /// Position of a row-major index.
    pub fn pos_of(&self, id: usize) -> CellPos {
        CellPos::new(id / self.size, id % self.size)
    }
}
