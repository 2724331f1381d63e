//! The append-only step trace shared by both solvers, and the replay rules
//! that make it reconstructible.
//!
//! Backtracks are recorded as events, never as erasures: a consumer replaying
//! the trace sees the whole search process, not just the final path.
//!
//! Replay model: starting from an all-empty grid, an `Assignment` step sets
//! `grid[position] = value` (givens enter the trace as ordinary assignment
//! steps), a `Backtrack` step clears `grid[position]`, and the two
//! propagation kinds leave the grid untouched. Every snapshot a step carries
//! equals the replayed grid immediately after applying that step.

use serde::{Deserialize, Serialize};

use crate::puzzle::{CellPos, CellValue};
use crate::solver::domain::Grid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    /// A cell was set to a value, either a confirmed given or a search
    /// decision.
    Assignment,
    /// An assignment was undone (or an impossible cell abandoned).
    Backtrack,
    /// A single cell's domain shrank during propagation.
    ConstraintPropagation,
    /// A propagation pass reached its fixpoint.
    ArcConsistency,
}

/// One event in the solving process.
///
/// A single schema serves every consumer: step-type tagging with a
/// description for timeline views, and per-step grid snapshots for replay,
/// so no consumer needs a second record shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionStep {
    pub kind: StepKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<CellPos>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CellValue>,
    /// For assignments, the number of candidates the value was chosen from;
    /// for propagation, the domain size after shrinking.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_size: Option<usize>,
    /// For `ArcConsistency`, how many distinct cell domains the pass
    /// narrowed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cells_affected: Option<usize>,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grid: Option<Grid>,
}

/// Accumulates ordered step events for one solve call.
///
/// Statistics are derived, not separately tracked: the backtrack counter is
/// the number of `Backtrack` events in the log.
#[derive(Debug)]
pub struct TraceRecorder {
    steps: Vec<SolutionStep>,
    record_snapshots: bool,
}

impl TraceRecorder {
    pub fn new(record_snapshots: bool) -> Self {
        Self {
            steps: Vec::new(),
            record_snapshots,
        }
    }

    pub fn record_snapshots(&self) -> bool {
        self.record_snapshots
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn steps(&self) -> &[SolutionStep] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<SolutionStep> {
        self.steps
    }

    pub fn backtracks(&self) -> u64 {
        self.steps
            .iter()
            .filter(|step| step.kind == StepKind::Backtrack)
            .count() as u64
    }

    pub fn assignment(
        &mut self,
        position: CellPos,
        value: CellValue,
        domain_size: usize,
        grid: Option<Grid>,
        description: String,
    ) {
        self.steps.push(SolutionStep {
            kind: StepKind::Assignment,
            position: Some(position),
            value: Some(value),
            domain_size: Some(domain_size),
            cells_affected: None,
            description,
            grid,
        });
    }

    pub fn backtrack(&mut self, position: CellPos, grid: Option<Grid>, description: String) {
        self.steps.push(SolutionStep {
            kind: StepKind::Backtrack,
            position: Some(position),
            value: None,
            domain_size: None,
            cells_affected: None,
            description,
            grid,
        });
    }

    pub fn propagation(
        &mut self,
        position: CellPos,
        remaining: usize,
        grid: Option<Grid>,
        description: String,
    ) {
        self.steps.push(SolutionStep {
            kind: StepKind::ConstraintPropagation,
            position: Some(position),
            value: None,
            domain_size: Some(remaining),
            cells_affected: None,
            description,
            grid,
        });
    }

    pub fn arc_pass(&mut self, cells_affected: usize, grid: Option<Grid>, description: String) {
        self.steps.push(SolutionStep {
            kind: StepKind::ArcConsistency,
            position: None,
            value: None,
            domain_size: None,
            cells_affected: Some(cells_affected),
            description,
            grid,
        });
    }
}

/// Applies one step's grid effect in place.
pub fn apply_step(grid: &mut Grid, step: &SolutionStep) {
    match step.kind {
        StepKind::Assignment => {
            let pos = step.position.expect("assignment step without a position");
            grid[pos.row][pos.col] = step.value;
        }
        StepKind::Backtrack => {
            let pos = step.position.expect("backtrack step without a position");
            grid[pos.row][pos.col] = None;
        }
        StepKind::ConstraintPropagation | StepKind::ArcConsistency => {}
    }
}

/// Replays a full trace from the empty grid of the given size.
pub fn replay(size: usize, steps: &[SolutionStep]) -> Grid {
    let mut grid = vec![vec![None; size]; size];
    for step in steps {
        apply_step(&mut grid, step);
    }
    grid
}

/// Checks that every snapshot in the trace equals the replayed grid at that
/// point, returning the index of the first mismatching step.
pub fn verify_snapshots(size: usize, steps: &[SolutionStep]) -> Result<(), usize> {
    let mut grid = vec![vec![None; size]; size];
    for (index, step) in steps.iter().enumerate() {
        apply_step(&mut grid, step);
        if let Some(snapshot) = &step.grid {
            if *snapshot != grid {
                return Err(index);
            }
        }
    }
    Ok(())
}
