use serde::Serialize;

use crate::solver::trace::SolutionStep;

pub type Result<T, E = SolveError> = core::result::Result<T, E>;

/// Rejection reasons for malformed puzzle descriptions.
///
/// All of these are detected during [`Puzzle`](crate::puzzle::Puzzle)
/// construction, before any search begins. A puzzle whose givens already
/// violate the Latin-square or inequality rules is *not* malformed; both
/// solvers discover that through the normal search path and report
/// [`SolveError::Unsatisfiable`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PuzzleError {
    #[error("grid size must be at least 2, got {size}")]
    SizeTooSmall { size: usize },

    #[error("grid must have {expected} rows, got {actual}")]
    WrongRowCount { expected: usize, actual: usize },

    #[error("row {row} must have {expected} cells, got {actual}")]
    WrongRowLength {
        row: usize,
        expected: usize,
        actual: usize,
    },

    #[error("prefilled value {value} at ({row}, {col}) is outside 1..={size}")]
    ValueOutOfRange {
        row: usize,
        col: usize,
        value: u32,
        size: usize,
    },

    #[error("constraint endpoint ({row}, {col}) is outside the {size}x{size} grid")]
    CellOutOfBounds { row: usize, col: usize, size: usize },

    #[error("constraint references cell ({row}, {col}) twice")]
    SelfReference { row: usize, col: usize },
}

/// Why a solve call was cut short before reaching a terminal search outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum AbortReason {
    #[error("cancellation was requested")]
    Cancelled,
    #[error("the solve deadline expired")]
    DeadlineExceeded,
    #[error("the step budget was exhausted")]
    StepBudgetExhausted,
}

/// The error taxonomy of the solve operation.
///
/// `Unsatisfiable` and `Aborted` carry the full step trace accumulated up to
/// the point of failure so a caller can explain *why* the search ended.
/// Callers never receive a partial solution grid through any of these
/// variants.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolveError {
    #[error("invalid puzzle: {0}")]
    InvalidPuzzle(#[from] PuzzleError),

    /// Search and propagation exhausted every possibility. A normal terminal
    /// outcome, not a defect.
    #[error("puzzle is unsatisfiable after {backtracks} backtracks")]
    Unsatisfiable {
        backtracks: u64,
        time_taken_ms: f64,
        steps: Vec<SolutionStep>,
    },

    /// The solve was cancelled or exceeded its budget. Unlike
    /// `Unsatisfiable`, this asserts nothing about solvability.
    #[error("solve aborted: {reason}")]
    Aborted {
        reason: AbortReason,
        steps: Vec<SolutionStep>,
    },
}

impl SolveError {
    /// A stable machine-checkable tag for the boundary layer.
    pub fn kind(&self) -> &'static str {
        match self {
            SolveError::InvalidPuzzle(_) => "invalid_puzzle",
            SolveError::Unsatisfiable { .. } => "unsatisfiable",
            SolveError::Aborted { .. } => "solve_aborted",
        }
    }
}
