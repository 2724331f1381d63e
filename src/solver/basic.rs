//! The baseline solver: exhaustive depth-first backtracking with
//! assignment-time checking and no propagation.
//!
//! Cell order is a fixed row-major scan; values are tried ascending,
//! skipping only candidates that clash with an already-assigned row/column
//! peer or inequality neighbor. Its backtrack and step counts are the
//! reproducible worst-case reference the optimized solver is compared
//! against.

use tracing::debug;

use crate::error::AbortReason;
use crate::puzzle::CellValue;
use crate::solver::domain::DomainStore;
use crate::solver::engine::{CellId, SearchContext, SearchOutcome, SearchStrategy};
use crate::solver::graph::ConstraintGraph;
use crate::solver::heuristics::variable::{RowMajorSelection, VariableSelectionHeuristic};

pub struct BasicSolver;

/// One decision point on the explicit search stack.
struct Frame {
    cell: CellId,
    candidates: std::vec::IntoIter<CellValue>,
    /// How many candidates the frame started with; recorded on assignments.
    choices: usize,
    /// The value currently placed at `cell`, if any.
    placed: Option<CellValue>,
}

impl SearchStrategy for BasicSolver {
    fn run(&self, cx: &mut SearchContext<'_>) -> Result<SearchOutcome, AbortReason> {
        if !confirm_givens(cx)? {
            return Ok(SearchOutcome::Exhausted);
        }
        if cx.store.is_complete() {
            return Ok(SearchOutcome::Solved);
        }

        let first = RowMajorSelection
            .select(&cx.store, &cx.graph)
            .expect("incomplete store has an unassigned cell");
        let mut stack = vec![new_frame(cx, first)];

        loop {
            cx.check_abort()?;
            let Some(frame) = stack.last_mut() else {
                debug!("search space exhausted");
                return Ok(SearchOutcome::Exhausted);
            };

            if let Some(undone) = frame.placed.take() {
                // The subtree under the previous value failed.
                let pos = cx.store.pos_of(frame.cell);
                cx.store.pop_frame();
                let snapshot = cx.snapshot();
                cx.trace.backtrack(
                    pos,
                    snapshot,
                    format!("Backtracked from {pos}: value {undone} led to a dead end"),
                );
            }

            match frame.candidates.next() {
                Some(value) => {
                    let cell = frame.cell;
                    let choices = frame.choices;
                    frame.placed = Some(value);

                    cx.store.push_frame();
                    cx.store
                        .assign(cell, value)
                        .expect("basic solver candidates stay in the untouched domain");
                    let pos = cx.store.pos_of(cell);
                    let snapshot = cx.snapshot();
                    cx.trace.assignment(
                        pos,
                        value,
                        choices,
                        snapshot,
                        format!("Assigned value {value} to {pos}"),
                    );

                    if cx.store.is_complete() {
                        return Ok(SearchOutcome::Solved);
                    }
                    let next = RowMajorSelection
                        .select(&cx.store, &cx.graph)
                        .expect("incomplete store has an unassigned cell");
                    let next_frame = new_frame(cx, next);
                    stack.push(next_frame);
                }
                None => {
                    // Nothing placed here anymore; the undo above already
                    // emitted the backtrack for the last value.
                    stack.pop();
                }
            }
        }
    }
}

/// Confirms prefilled cells in row-major order through the normal
/// assignment path. A given clashing with an earlier one is abandoned with
/// a backtrack step; contradictory givens thus surface as an unsatisfiable
/// search, not a construction error.
fn confirm_givens(cx: &mut SearchContext<'_>) -> Result<bool, AbortReason> {
    let puzzle = cx.puzzle;
    for (pos, value) in puzzle.givens() {
        cx.check_abort()?;
        let cell = puzzle.index_of(pos);
        if !is_consistent(&cx.store, &cx.graph, cell, value) {
            let snapshot = cx.snapshot();
            cx.trace.backtrack(
                pos,
                snapshot,
                format!("Given value {value} at {pos} conflicts with an earlier given"),
            );
            return Ok(false);
        }
        cx.store
            .assign(cell, value)
            .expect("a given's singleton domain holds its value");
        let snapshot = cx.snapshot();
        cx.trace.assignment(
            pos,
            value,
            1,
            snapshot,
            format!("Confirmed given value {value} at {pos}"),
        );
    }
    Ok(true)
}

/// Whether placing `value` clashes with any *assigned* cell: row/column
/// uniqueness plus inequality constraints whose other endpoint is assigned.
/// Unassigned neighbors are never consulted; that is the whole point of the
/// baseline.
fn is_consistent(
    store: &DomainStore,
    graph: &ConstraintGraph,
    cell: CellId,
    value: CellValue,
) -> bool {
    if graph
        .peers(cell)
        .iter()
        .any(|&peer| store.assigned_value(peer) == Some(value))
    {
        return false;
    }
    graph
        .edges(cell)
        .iter()
        .all(|edge| match store.assigned_value(edge.neighbor) {
            Some(neighbor_value) => edge.relation.holds(value, neighbor_value),
            None => true,
        })
}

fn new_frame(cx: &SearchContext<'_>, cell: CellId) -> Frame {
    let candidates: Vec<CellValue> = (1..=cx.store.grid_size() as CellValue)
        .filter(|&value| is_consistent(&cx.store, &cx.graph, cell, value))
        .collect();
    Frame {
        cell,
        choices: candidates.len(),
        candidates: candidates.into_iter(),
        placed: None,
    }
}
