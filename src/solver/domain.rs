//! The mutable search state: per-cell candidate sets with a trail-based
//! undo log.
//!
//! Domains are `im::OrdSet`s, so the trail can keep the prior set handle for
//! every touched cell and restore it verbatim on backtrack; structural
//! sharing makes both the save and the restore cheap regardless of depth.
//!
//! A cell is *assigned* only when its collapse to a singleton was recorded
//! through [`DomainStore::assign`]. A domain that happens to shrink to one
//! value during propagation stays unassigned until a solver decides on it.

use im::OrdSet;

use crate::puzzle::{CellPos, CellValue, Puzzle};
use crate::solver::engine::CellId;

/// Assigned values only, row-major. What trace snapshots and solutions carry.
pub type Grid = Vec<Vec<Option<CellValue>>>;

/// Attempt to assign a value that is no longer in the cell's domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("value {value} is not in the domain of cell {cell}")]
pub struct DomainConflict {
    pub cell: CellId,
    pub value: CellValue,
}

/// Outcome of removing one candidate value from a cell's domain.
///
/// `Wipeout` is a normal, expected signal that the current branch is dead;
/// it triggers backtracking rather than surfacing to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction {
    /// The value was not a candidate; nothing changed.
    Unchanged,
    /// The value was removed and candidates remain.
    Shrunk { remaining: usize },
    /// The domain emptied, or the removal contradicts an assigned value.
    Wipeout,
}

#[derive(Debug, Clone)]
struct TrailEntry {
    cell: CellId,
    prior: OrdSet<CellValue>,
}

#[derive(Debug)]
pub struct DomainStore {
    size: usize,
    domains: Vec<OrdSet<CellValue>>,
    assigned: Vec<Option<CellValue>>,
    assigned_count: usize,
    trail: Vec<TrailEntry>,
    frames: Vec<usize>,
}

impl DomainStore {
    /// Initial state for a puzzle: full domains for empty cells, singleton
    /// domains for givens. No cell starts assigned; givens are confirmed by
    /// the solvers through the normal assignment path.
    pub fn new(puzzle: &Puzzle) -> Self {
        let size = puzzle.size();
        let full: OrdSet<CellValue> = (1..=size as CellValue).collect();
        let domains = puzzle
            .positions()
            .map(|pos| match puzzle.given(pos) {
                Some(value) => OrdSet::unit(value),
                None => full.clone(),
            })
            .collect();
        Self {
            size,
            domains,
            assigned: vec![None; puzzle.cell_count()],
            assigned_count: 0,
            trail: Vec::new(),
            frames: Vec::new(),
        }
    }

    pub fn grid_size(&self) -> usize {
        self.size
    }

    pub fn cell_count(&self) -> usize {
        self.domains.len()
    }

    pub fn domain(&self, cell: CellId) -> &OrdSet<CellValue> {
        &self.domains[cell]
    }

    pub fn domain_len(&self, cell: CellId) -> usize {
        self.domains[cell].len()
    }

    pub fn min_value(&self, cell: CellId) -> Option<CellValue> {
        self.domains[cell].get_min().copied()
    }

    pub fn max_value(&self, cell: CellId) -> Option<CellValue> {
        self.domains[cell].get_max().copied()
    }

    pub fn assigned_value(&self, cell: CellId) -> Option<CellValue> {
        self.assigned[cell]
    }

    pub fn is_assigned(&self, cell: CellId) -> bool {
        self.assigned[cell].is_some()
    }

    pub fn assigned_count(&self) -> usize {
        self.assigned_count
    }

    pub fn is_complete(&self) -> bool {
        self.assigned_count == self.domains.len()
    }

    /// Unassigned cells in row-major order.
    pub fn unassigned_cells(&self) -> impl Iterator<Item = CellId> + '_ {
        self.assigned
            .iter()
            .enumerate()
            .filter_map(|(cell, value)| value.is_none().then_some(cell))
    }

    /// Collapses the cell's domain to `value` and records the decision.
    ///
    /// Fails with [`DomainConflict`] when `value` has already been pruned.
    /// Assigning an already-assigned cell is a programming error.
    pub fn assign(&mut self, cell: CellId, value: CellValue) -> Result<(), DomainConflict> {
        assert!(
            self.assigned[cell].is_none(),
            "cell {cell} is already assigned"
        );
        if !self.domains[cell].contains(&value) {
            return Err(DomainConflict { cell, value });
        }
        self.trail.push(TrailEntry {
            cell,
            prior: self.domains[cell].clone(),
        });
        self.domains[cell] = OrdSet::unit(value);
        self.assigned[cell] = Some(value);
        self.assigned_count += 1;
        Ok(())
    }

    /// Removes one candidate from a cell's domain.
    ///
    /// Assigned values never change during propagation: removing an assigned
    /// cell's own value is reported as `Wipeout` and the singleton is left
    /// intact, so the invariant that an assigned cell holds its value is
    /// preserved even on dead branches.
    pub fn restrict(&mut self, cell: CellId, value: CellValue) -> Restriction {
        if !self.domains[cell].contains(&value) {
            return Restriction::Unchanged;
        }
        if self.assigned[cell].is_some() {
            return Restriction::Wipeout;
        }
        self.trail.push(TrailEntry {
            cell,
            prior: self.domains[cell].clone(),
        });
        self.domains[cell] = self.domains[cell].without(&value);
        match self.domains[cell].len() {
            0 => Restriction::Wipeout,
            remaining => Restriction::Shrunk { remaining },
        }
    }

    /// Opens an undo scope for one assignment and its propagation.
    pub fn push_frame(&mut self) {
        self.frames.push(self.trail.len());
    }

    /// Rolls back every mutation since the matching [`push_frame`], restoring
    /// prior domains exactly and unassigning any cell assigned inside the
    /// scope.
    ///
    /// [`push_frame`]: DomainStore::push_frame
    pub fn pop_frame(&mut self) {
        let mark = self
            .frames
            .pop()
            .expect("pop_frame without a matching push_frame");
        while self.trail.len() > mark {
            let entry = self.trail.pop().expect("trail shorter than frame mark");
            if self.assigned[entry.cell].take().is_some() {
                self.assigned_count -= 1;
            }
            self.domains[entry.cell] = entry.prior;
        }
    }

    pub fn frame_depth(&self) -> usize {
        self.frames.len()
    }

    /// Current assigned values as a grid, for trace snapshots.
    pub fn snapshot_grid(&self) -> Grid {
        (0..self.size)
            .map(|row| {
                (0..self.size)
                    .map(|col| self.assigned[row * self.size + col])
                    .collect()
            })
            .collect()
    }

    /// The fully-assigned grid. Panics if any cell is unassigned; callers
    /// only reach this after a successful search.
    pub fn solved_grid(&self) -> Vec<Vec<CellValue>> {
        (0..self.size)
            .map(|row| {
                (0..self.size)
                    .map(|col| {
                        self.assigned[row * self.size + col]
                            .expect("solved grid requested before every cell was assigned")
                    })
                    .collect()
            })
            .collect()
    }

    pub fn pos_of(&self, cell: CellId) -> CellPos {
        CellPos::new(cell / self.size, cell % self.size)
    }
}
