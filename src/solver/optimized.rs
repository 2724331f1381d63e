//! The heuristic solver: Minimum-Remaining-Values cell selection,
//! least-constraining-value ordering, and constraint propagation to a
//! fixpoint after every assignment.
//!
//! Propagation removes the assigned value from all row/column peers, then
//! revises inequality arcs from domain bounds until quiescent. A wiped-out
//! domain undoes the current assignment immediately instead of recursing
//! past it.

use std::collections::BTreeSet;

use tracing::{debug, trace};

use crate::error::AbortReason;
use crate::puzzle::{CellValue, Relation};
use crate::solver::domain::{DomainStore, Restriction};
use crate::solver::engine::{CellId, SearchContext, SearchOutcome, SearchStrategy};
use crate::solver::graph::ConstraintGraph;
use crate::solver::heuristics::value::{LeastConstrainingValue, ValueOrderingHeuristic};
use crate::solver::heuristics::variable::{MinimumRemainingValues, VariableSelectionHeuristic};
use crate::solver::trace::TraceRecorder;
use crate::solver::work_list::WorkList;

pub struct OptimizedSolver;

struct Frame {
    cell: CellId,
    candidates: std::vec::IntoIter<CellValue>,
    /// Domain size the value is chosen from, recorded on assignments.
    choices: usize,
    placed: Option<CellValue>,
}

impl SearchStrategy for OptimizedSolver {
    fn run(&self, cx: &mut SearchContext<'_>) -> Result<SearchOutcome, AbortReason> {
        if !confirm_givens(cx)? {
            return Ok(SearchOutcome::Exhausted);
        }
        if !propagate_initial(cx) {
            return Ok(SearchOutcome::Exhausted);
        }
        if cx.store.is_complete() {
            return Ok(SearchOutcome::Solved);
        }

        let mut stack = vec![new_frame(cx)];

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
                    let pos = cx.store.pos_of(cell);

                    cx.store.push_frame();
                    cx.store
                        .assign(cell, value)
                        .expect("frame candidates stay valid while the frame is open");
                    let snapshot = cx.snapshot();
                    cx.trace.assignment(
                        pos,
                        value,
                        choices,
                        snapshot,
                        format!("Assigned value {value} to {pos} (chosen from {choices} candidates)"),
                    );

                    match propagate_assignment(cx, cell) {
                        Ok(()) => {
                            if cx.store.is_complete() {
                                return Ok(SearchOutcome::Solved);
                            }
                            frame.placed = Some(value);
                            let next = new_frame(cx);
                            stack.push(next);
                        }
                        Err(wiped) => {
                            // Wipeouts are cheaper to detect than to recurse
                            // past: undo now and move to the next value.
                            cx.store.pop_frame();
                            let wiped_pos = cx.store.pos_of(wiped);
                            let snapshot = cx.snapshot();
                            cx.trace.backtrack(
                                pos,
                                snapshot,
                                format!(
                                    "Backtracked from {pos}: assigning {value} wiped out the domain of {wiped_pos}"
                                ),
                            );
                        }
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
    }
}

/// Confirms each given through the normal assignment path and immediately
/// propagates it inside its own undo frame. A given whose propagation wipes
/// out a domain is rolled back and recorded as a backtrack, so contradictory
/// givens surface exactly like any other dead branch.
fn confirm_givens(cx: &mut SearchContext<'_>) -> Result<bool, AbortReason> {
    let puzzle = cx.puzzle;
    for (pos, value) in puzzle.givens() {
        cx.check_abort()?;
        let cell = puzzle.index_of(pos);

        cx.store.push_frame();
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

        if let Err(wiped) = propagate_assignment(cx, cell) {
            cx.store.pop_frame();
            let wiped_pos = cx.store.pos_of(wiped);
            let snapshot = cx.snapshot();
            cx.trace.backtrack(
                pos,
                snapshot,
                format!("Given value {value} at {pos} wiped out the domain of {wiped_pos}"),
            );
            return Ok(false);
        }
        // Givens are permanent: their frames stay open beneath the search.
    }
    Ok(true)
}

/// One pre-search pass over every inequality arc, catching contradictions
/// that involve no given at all. Returns `false` on wipeout.
fn propagate_initial(cx: &mut SearchContext<'_>) -> bool {
    let SearchContext {
        graph,
        store,
        trace,
        ..
    } = cx;

    let mut worklist = WorkList::new();
    for cell in 0..store.cell_count() {
        for edge in graph.edges(cell) {
            worklist.push_back(cell, *edge);
        }
    }

    let mut affected = BTreeSet::new();
    match drain_worklist(graph, store, trace, worklist, &mut affected) {
        Ok(()) => {
            finish_pass(store, trace, &affected, "Initial propagation");
            true
        }
        Err(wiped) => {
            let pos = store.pos_of(wiped);
            let snapshot = trace
                .record_snapshots()
                .then(|| store.snapshot_grid());
            trace.backtrack(
                pos,
                snapshot,
                format!("Domain of {pos} wiped out during initial propagation"),
            );
            false
        }
    }
}

/// Propagates the consequences of assigning `cell` until no domain changes:
/// the assigned value leaves every open peer, and inequality arcs are
/// revised from the narrowed bounds. Returns the wiped-out cell on failure;
/// the caller owns the undo.
fn propagate_assignment(cx: &mut SearchContext<'_>, cell: CellId) -> Result<(), CellId> {
    let SearchContext {
        graph,
        store,
        trace,
        ..
    } = cx;

    let value = store
        .assigned_value(cell)
        .expect("propagation starts from an assigned cell");
    let source_pos = store.pos_of(cell);

    let mut worklist = WorkList::new();
    let mut affected = BTreeSet::new();

    for &peer in graph.peers(cell) {
        match store.restrict(peer, value) {
            Restriction::Unchanged => {}
            Restriction::Shrunk { remaining } => {
                affected.insert(peer);
                let pos = store.pos_of(peer);
                let snapshot = trace
                    .record_snapshots()
                    .then(|| store.snapshot_grid());
                trace.propagation(
                    pos,
                    remaining,
                    snapshot,
                    format!(
                        "Removed {value} from {pos} (peer of {source_pos}); {remaining} candidates remain"
                    ),
                );
                for edge in graph.edges(peer) {
                    worklist.push_back(edge.neighbor, edge.mirrored(peer));
                }
            }
            Restriction::Wipeout => return Err(peer),
        }
    }

    // The narrowed cell itself and its inequality neighbors seed the arcs.
    for edge in graph.edges(cell) {
        worklist.push_back(cell, *edge);
        worklist.push_back(edge.neighbor, edge.mirrored(cell));
    }

    drain_worklist(graph, store, trace, worklist, &mut affected)?;
    finish_pass(store, trace, &affected, "Propagation");
    Ok(())
}

/// Revises queued arcs until the worklist is empty. Each revision keeps only
/// the target values that can still satisfy the relation against the
/// neighbor's current bounds; every shrink re-queues the arcs of the shrunk
/// cell.
fn drain_worklist(
    graph: &ConstraintGraph,
    store: &mut DomainStore,
    trace: &mut TraceRecorder,
    mut worklist: WorkList,
    affected: &mut BTreeSet<CellId>,
) -> Result<(), CellId> {
    while let Some((target, edge)) = worklist.pop_front() {
        let Some(bound) = (match edge.relation {
            Relation::Greater => store.min_value(edge.neighbor),
            Relation::Less => store.max_value(edge.neighbor),
        }) else {
            continue;
        };
        let to_remove: Vec<CellValue> = store
            .domain(target)
            .iter()
            .copied()
            .filter(|&candidate| match edge.relation {
                Relation::Greater => candidate <= bound,
                Relation::Less => candidate >= bound,
            })
            .collect();
        if to_remove.is_empty() {
            continue;
        }

        let mut remaining = 0;
        for candidate in to_remove {
            match store.restrict(target, candidate) {
                Restriction::Unchanged => {}
                Restriction::Shrunk { remaining: left } => remaining = left,
                Restriction::Wipeout => return Err(target),
            }
        }

        affected.insert(target);
        let pos = store.pos_of(target);
        let neighbor_pos = store.pos_of(edge.neighbor);
        trace!(%pos, %neighbor_pos, remaining, "revised arc");
        let snapshot = trace
            .record_snapshots()
            .then(|| store.snapshot_grid());
        trace.propagation(
            pos,
            remaining,
            snapshot,
            format!(
                "Pruned {pos} to satisfy {pos} {} {neighbor_pos}; {remaining} candidates remain",
                edge.relation
            ),
        );
        for next_edge in graph.edges(target) {
            worklist.push_back(next_edge.neighbor, next_edge.mirrored(target));
        }
    }
    Ok(())
}

/// Closes a fixpoint pass with one summary step, skipped when the pass
/// changed nothing.
fn finish_pass(
    store: &DomainStore,
    trace: &mut TraceRecorder,
    affected: &BTreeSet<CellId>,
    label: &str,
) {
    if affected.is_empty() {
        return;
    }
    let snapshot = trace
        .record_snapshots()
        .then(|| store.snapshot_grid());
    trace.arc_pass(
        affected.len(),
        snapshot,
        format!(
            "{label} reached a fixpoint; {} cell domains narrowed",
            affected.len()
        ),
    );
}

fn new_frame(cx: &SearchContext<'_>) -> Frame {
    let cell = MinimumRemainingValues
        .select(&cx.store, &cx.graph)
        .expect("incomplete store has an unassigned cell");
    let candidates = LeastConstrainingValue.order(cell, &cx.store, &cx.graph);
    Frame {
        cell,
        choices: candidates.len(),
        candidates: candidates.into_iter(),
        placed: None,
    }
}
