//! The engine facade: one synchronous `solve` operation per variant, plus
//! the side-by-side comparison run.
//!
//! Each solve call owns its domain store, constraint graph and trace
//! recorder, so independent calls share no mutable state and may run in
//! parallel freely.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{AbortReason, Result, SolveError};
use crate::puzzle::{CellPos, CellValue, Puzzle};
use crate::solver::basic::BasicSolver;
use crate::solver::domain::{DomainStore, Grid};
use crate::solver::graph::ConstraintGraph;
use crate::solver::optimized::OptimizedSolver;
use crate::solver::trace::{SolutionStep, TraceRecorder};

/// Row-major index of a cell, the solver-internal variable identifier.
pub type CellId = usize;
/// Index of a constraint in [`Puzzle::constraints`].
pub type ConstraintId = usize;

/// Which solving strategy to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SolverVariant {
    /// Exhaustive backtracking with assignment-time checking only. The
    /// reproducible worst-case reference.
    Basic,
    /// MRV and LCV ordering with propagation to a fixpoint after every
    /// assignment.
    Optimized,
}

impl fmt::Display for SolverVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverVariant::Basic => write!(f, "basic"),
            SolverVariant::Optimized => write!(f, "optimized"),
        }
    }
}

/// Caller-configurable limits for one solve call.
///
/// The cancellation flag and both budgets are polled cooperatively at each
/// decision point; recursion depth is bounded by the cell count, so the
/// checks are cheap at that granularity.
#[derive(Debug, Clone)]
pub struct SolveOptions {
    /// Attach a full grid snapshot to every recorded step.
    pub record_snapshots: bool,
    /// Wall-clock budget for the call, measured from its start.
    pub deadline: Option<Duration>,
    /// Maximum number of steps to record before giving up.
    pub max_steps: Option<usize>,
    /// External cancellation, e.g. from a UI thread.
    pub cancel: Option<Arc<AtomicBool>>,
}

impl Default for SolveOptions {
    fn default() -> Self {
        Self {
            record_snapshots: true,
            deadline: None,
            max_steps: None,
            cancel: None,
        }
    }
}

/// A successful solve: the full grid plus the statistics and the ordered
/// step trace that produced it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SolutionResult {
    pub solution: Vec<Vec<CellValue>>,
    pub backtracks: u64,
    pub time_taken_ms: f64,
    pub steps: Vec<SolutionStep>,
}

/// Both variants run against the same puzzle on isolated state.
#[derive(Debug)]
pub struct ComparedRun {
    pub basic: Result<SolutionResult>,
    pub optimized: Result<SolutionResult>,
}

/// Everything one search owns: the puzzle view, the precomputed graph, the
/// mutable domain store, and the trace being accumulated.
pub struct SearchContext<'a> {
    pub puzzle: &'a Puzzle,
    pub graph: ConstraintGraph,
    pub store: DomainStore,
    pub trace: TraceRecorder,
    pub options: &'a SolveOptions,
    pub started: Instant,
}

impl SearchContext<'_> {
    /// Cooperative cancellation/budget check, called once per decision point.
    pub fn check_abort(&self) -> core::result::Result<(), AbortReason> {
        if let Some(cancel) = &self.options.cancel {
            if cancel.load(Ordering::Relaxed) {
                return Err(AbortReason::Cancelled);
            }
        }
        if let Some(deadline) = self.options.deadline {
            if self.started.elapsed() >= deadline {
                return Err(AbortReason::DeadlineExceeded);
            }
        }
        if let Some(max_steps) = self.options.max_steps {
            if self.trace.len() >= max_steps {
                return Err(AbortReason::StepBudgetExhausted);
            }
        }
        Ok(())
    }

    /// The grid to attach to the next step, if snapshots are enabled.
    pub fn snapshot(&self) -> Option<Grid> {
        self.trace
            .record_snapshots()
            .then(|| self.store.snapshot_grid())
    }

    pub fn pos(&self, cell: CellId) -> CellPos {
        self.store.pos_of(cell)
    }
}

/// Terminal outcomes of a search, before the engine attaches timing and
/// trace data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    Solved,
    Exhausted,
}

/// A complete solving strategy over a [`SearchContext`].
pub trait SearchStrategy {
    fn run(&self, cx: &mut SearchContext<'_>) -> core::result::Result<SearchOutcome, AbortReason>;
}

/// The engine shared by every caller. Stateless; all per-call state lives in
/// the [`SearchContext`] it builds.
pub struct SolverEngine;

impl SolverEngine {
    pub fn new() -> Self {
        Self
    }

    /// Solves the puzzle with the chosen variant and default options.
    pub fn solve(&self, puzzle: &Puzzle, variant: SolverVariant) -> Result<SolutionResult> {
        self.solve_with_options(puzzle, variant, &SolveOptions::default())
    }

    /// Solves the puzzle with explicit options.
    ///
    /// Elapsed time covers the whole call and is measured exactly once, here.
    pub fn solve_with_options(
        &self,
        puzzle: &Puzzle,
        variant: SolverVariant,
        options: &SolveOptions,
    ) -> Result<SolutionResult> {
        let started = Instant::now();
        debug!(%variant, size = puzzle.size(), "starting solve");

        let mut cx = SearchContext {
            puzzle,
            graph: ConstraintGraph::build(puzzle),
            store: DomainStore::new(puzzle),
            trace: TraceRecorder::new(options.record_snapshots),
            options,
            started,
        };

        let outcome = match variant {
            SolverVariant::Basic => BasicSolver.run(&mut cx),
            SolverVariant::Optimized => OptimizedSolver.run(&mut cx),
        };

        let time_taken_ms = started.elapsed().as_secs_f64() * 1_000.0;
        let backtracks = cx.trace.backtracks();
        debug!(%variant, ?outcome, backtracks, "solve finished");

        match outcome {
            Ok(SearchOutcome::Solved) => Ok(SolutionResult {
                solution: cx.store.solved_grid(),
                backtracks,
                time_taken_ms,
                steps: cx.trace.into_steps(),
            }),
            Ok(SearchOutcome::Exhausted) => Err(SolveError::Unsatisfiable {
                backtracks,
                time_taken_ms,
                steps: cx.trace.into_steps(),
            }),
            Err(reason) => Err(SolveError::Aborted {
                reason,
                steps: cx.trace.into_steps(),
            }),
        }
    }

    /// Runs both variants against the same puzzle for benchmarking, each on
    /// its own isolated state.
    pub fn solve_compared(&self, puzzle: &Puzzle) -> ComparedRun {
        self.solve_compared_with_options(puzzle, &SolveOptions::default())
    }

    pub fn solve_compared_with_options(
        &self,
        puzzle: &Puzzle,
        options: &SolveOptions,
    ) -> ComparedRun {
        std::thread::scope(|scope| {
            let basic = scope
                .spawn(|| self.solve_with_options(puzzle, SolverVariant::Basic, options));
            let optimized = scope
                .spawn(|| self.solve_with_options(puzzle, SolverVariant::Optimized, options));
            ComparedRun {
                basic: basic.join().expect("basic solver thread panicked"),
                optimized: optimized.join().expect("optimized solver thread panicked"),
            }
        })
    }
}

impl Default for SolverEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::error::PuzzleError;
    use crate::puzzle::{CellPos, InequalityConstraint, Relation};
    use crate::solver::testing::{assert_valid_solution, grid_from_rows};
    use crate::solver::trace::{verify_snapshots, StepKind};

    const BOTH: [SolverVariant; 2] = [SolverVariant::Basic, SolverVariant::Optimized];

    fn worked_3x3() -> Puzzle {
        // Two givens plus two inequalities; propagation alone pins it down.
        let grid = grid_from_rows(&[&[0, 0, 1], &[0, 0, 0], &[1, 0, 0]]);
        let constraints = vec![
            InequalityConstraint::new(CellPos::new(0, 0), CellPos::new(0, 1), Relation::Greater),
            InequalityConstraint::new(CellPos::new(1, 1), CellPos::new(2, 1), Relation::Less),
        ];
        Puzzle::new(3, grid, constraints).unwrap()
    }

    #[test]
    fn both_variants_solve_the_worked_3x3() {
        let _ = tracing_subscriber::fmt::try_init();
        let puzzle = worked_3x3();
        for variant in BOTH {
            let result = SolverEngine::new().solve(&puzzle, variant).unwrap();
            assert_valid_solution(&puzzle, &result.solution);
            assert_eq!(result.solution[0], vec![3, 2, 1]);
        }
    }

    #[test]
    fn empty_4x4_is_solvable_by_both_variants() {
        let puzzle = Puzzle::empty(4).unwrap();
        for variant in BOTH {
            let result = SolverEngine::new().solve(&puzzle, variant).unwrap();
            assert_valid_solution(&puzzle, &result.solution);
        }
    }

    #[test]
    fn contradictory_givens_are_unsatisfiable_with_backtracks() {
        // Two 3s in the same row can never extend to a Latin square.
        let grid = grid_from_rows(&[&[3, 0, 3, 0], &[0; 4], &[0; 4], &[0; 4]]);
        let puzzle = Puzzle::new(4, grid, Vec::new()).unwrap();
        for variant in BOTH {
            let err = SolverEngine::new().solve(&puzzle, variant).unwrap_err();
            match err {
                SolveError::Unsatisfiable {
                    backtracks, steps, ..
                } => {
                    assert!(backtracks >= 1, "{variant}: expected backtracks");
                    assert!(!steps.is_empty(), "{variant}: expected a trace");
                }
                other => panic!("{variant}: expected Unsatisfiable, got {other:?}"),
            }
        }
    }

    #[test]
    fn consistent_fully_prefilled_grid_confirms_without_backtracking() {
        let grid = grid_from_rows(&[&[1, 2, 3], &[2, 3, 1], &[3, 1, 2]]);
        let puzzle = Puzzle::new(3, grid, Vec::new()).unwrap();
        for variant in BOTH {
            let result = SolverEngine::new().solve(&puzzle, variant).unwrap();
            assert_eq!(result.backtracks, 0, "{variant}");
            assert!(
                result
                    .steps
                    .iter()
                    .all(|step| step.kind == StepKind::Assignment),
                "{variant}: expected confirmation steps only"
            );
            assert_eq!(result.steps.len(), 9, "{variant}");
        }
    }

    #[test]
    fn optimized_backtracks_at_most_as_often_as_basic() {
        // Sparse constraints on an empty 8x8 grid; the descending chain in
        // row 0 defeats the basic solver's ascending trial order.
        let mut constraints = Vec::new();
        for col in 0..7 {
            constraints.push(InequalityConstraint::new(
                CellPos::new(0, col),
                CellPos::new(0, col + 1),
                Relation::Greater,
            ));
        }
        let puzzle = Puzzle::new(8, vec![vec![None; 8]; 8], constraints).unwrap();

        let run = SolverEngine::new().solve_compared(&puzzle);
        let basic = run.basic.unwrap();
        let optimized = run.optimized.unwrap();
        assert_valid_solution(&puzzle, &basic.solution);
        assert_valid_solution(&puzzle, &optimized.solution);
        assert!(basic.backtracks >= 1);
        assert!(optimized.backtracks <= basic.backtracks);
    }

    #[test]
    fn solving_twice_is_deterministic() {
        let puzzle = worked_3x3();
        for variant in BOTH {
            let first = SolverEngine::new().solve(&puzzle, variant).unwrap();
            let second = SolverEngine::new().solve(&puzzle, variant).unwrap();
            assert_eq!(first.solution, second.solution, "{variant}");
            assert_eq!(first.backtracks, second.backtracks, "{variant}");
            assert_eq!(first.steps, second.steps, "{variant}");
        }
    }

    #[test]
    fn backtrack_count_equals_backtrack_events() {
        let puzzle = Puzzle::empty(4).unwrap();
        for variant in BOTH {
            let result = SolverEngine::new().solve(&puzzle, variant).unwrap();
            let events = result
                .steps
                .iter()
                .filter(|step| step.kind == StepKind::Backtrack)
                .count() as u64;
            assert_eq!(result.backtracks, events, "{variant}");
        }
    }

    #[test]
    fn traces_replay_to_their_snapshots() {
        let puzzle = worked_3x3();
        for variant in BOTH {
            let result = SolverEngine::new().solve(&puzzle, variant).unwrap();
            assert_eq!(
                verify_snapshots(puzzle.size(), &result.steps),
                Ok(()),
                "{variant}"
            );
        }
    }

    #[test]
    fn compared_run_matches_individual_solves() {
        let puzzle = worked_3x3();
        let run = SolverEngine::new().solve_compared(&puzzle);
        let basic = SolverEngine::new()
            .solve(&puzzle, SolverVariant::Basic)
            .unwrap();
        let optimized = SolverEngine::new()
            .solve(&puzzle, SolverVariant::Optimized)
            .unwrap();
        assert_eq!(run.basic.unwrap().solution, basic.solution);
        assert_eq!(run.optimized.unwrap().solution, optimized.solution);
    }

    #[test]
    fn invalid_puzzle_is_rejected_before_search() {
        let err = Puzzle::new(1, vec![vec![None]], Vec::new()).unwrap_err();
        assert_eq!(err, PuzzleError::SizeTooSmall { size: 1 });
        let as_solve_error: SolveError = err.into();
        assert_eq!(as_solve_error.kind(), "invalid_puzzle");
    }

    #[test]
    fn preset_cancellation_aborts_immediately() {
        let puzzle = Puzzle::empty(4).unwrap();
        let cancel = Arc::new(AtomicBool::new(true));
        let options = SolveOptions {
            cancel: Some(cancel),
            ..SolveOptions::default()
        };
        for variant in BOTH {
            let err = SolverEngine::new()
                .solve_with_options(&puzzle, variant, &options)
                .unwrap_err();
            match err {
                SolveError::Aborted { reason, .. } => {
                    assert_eq!(reason, AbortReason::Cancelled, "{variant}")
                }
                other => panic!("{variant}: expected Aborted, got {other:?}"),
            }
        }
    }

    #[test]
    fn exhausted_step_budget_is_distinguished_from_unsatisfiable() {
        // Solvable instance, far more steps than the budget allows: the
        // outcome must be Aborted, which asserts nothing about solvability.
        let puzzle = Puzzle::empty(6).unwrap();
        let options = SolveOptions {
            max_steps: Some(1),
            ..SolveOptions::default()
        };
        for variant in BOTH {
            let err = SolverEngine::new()
                .solve_with_options(&puzzle, variant, &options)
                .unwrap_err();
            match err {
                SolveError::Aborted { reason, steps } => {
                    assert_eq!(reason, AbortReason::StepBudgetExhausted, "{variant}");
                    assert!(!steps.is_empty(), "{variant}");
                }
                other => panic!("{variant}: expected Aborted, got {other:?}"),
            }
        }
    }

    #[test]
    fn expired_deadline_aborts() {
        let puzzle = Puzzle::empty(5).unwrap();
        let options = SolveOptions {
            deadline: Some(Duration::ZERO),
            ..SolveOptions::default()
        };
        let err = SolverEngine::new()
            .solve_with_options(&puzzle, SolverVariant::Basic, &options)
            .unwrap_err();
        assert_eq!(err.kind(), "solve_aborted");
    }

    /// A satisfiable instance derived from the cyclic Latin square
    /// `((row + col) % n) + 1`: givens and constraints are sampled from that
    /// solution, so a solution always exists (though the solver may find a
    /// different one).
    fn seeded_puzzle(n: usize, given_seed: u64, constraint_seed: u64) -> Puzzle {
        let solution =
            |row: usize, col: usize| -> CellValue { (((row + col) % n) + 1) as CellValue };
        let grid: Vec<Vec<Option<CellValue>>> = (0..n)
            .map(|row| {
                (0..n)
                    .map(|col| {
                        let bit = (row * n + col) % 64;
                        ((given_seed >> bit) & 1 == 1).then(|| solution(row, col))
                    })
                    .collect()
            })
            .collect();
        let mut constraints = Vec::new();
        for row in 0..n {
            for col in 0..n - 1 {
                let bit = (row * (n - 1) + col) % 64;
                if (constraint_seed >> bit) & 1 == 1 {
                    let relation = if solution(row, col) > solution(row, col + 1) {
                        Relation::Greater
                    } else {
                        Relation::Less
                    };
                    constraints.push(InequalityConstraint::new(
                        CellPos::new(row, col),
                        CellPos::new(row, col + 1),
                        relation,
                    ));
                }
            }
        }
        Puzzle::new(n, grid, constraints).unwrap()
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn solved_puzzles_uphold_every_invariant(
            n in 3usize..=5,
            given_seed in any::<u64>(),
            constraint_seed in any::<u64>(),
        ) {
            let puzzle = seeded_puzzle(n, given_seed, constraint_seed);
            for variant in BOTH {
                let result = SolverEngine::new().solve(&puzzle, variant).unwrap();
                assert_valid_solution(&puzzle, &result.solution);
                prop_assert_eq!(verify_snapshots(n, &result.steps), Ok(()));
                let events = result
                    .steps
                    .iter()
                    .filter(|step| step.kind == StepKind::Backtrack)
                    .count() as u64;
                prop_assert_eq!(result.backtracks, events);
            }
        }
    }
}
