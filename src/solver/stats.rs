//! Tabular summaries of solve runs, for the CLI and for benchmarking
//! comparisons.

use prettytable::{Cell, Row, Table};

use crate::error::{Result, SolveError};
use crate::solver::engine::{ComparedRun, SolutionResult, SolverVariant};
use crate::solver::trace::{SolutionStep, StepKind};

pub fn count_kind(steps: &[SolutionStep], kind: StepKind) -> usize {
    steps.iter().filter(|step| step.kind == kind).count()
}

fn header() -> Row {
    Row::new(vec![
        Cell::new("Variant"),
        Cell::new("Outcome"),
        Cell::new("Backtracks"),
        Cell::new("Assignments"),
        Cell::new("Propagations"),
        Cell::new("Fixpoint Passes"),
        Cell::new("Total Steps"),
        Cell::new("Time (ms)"),
    ])
}

fn run_row(variant: SolverVariant, outcome: &Result<SolutionResult>) -> Row {
    let (label, backtracks, steps, time) = match outcome {
        Ok(result) => (
            "solved".to_string(),
            result.backtracks.to_string(),
            result.steps.as_slice(),
            format!("{:.3}", result.time_taken_ms),
        ),
        Err(SolveError::Unsatisfiable {
            backtracks,
            time_taken_ms,
            steps,
        }) => (
            "unsatisfiable".to_string(),
            backtracks.to_string(),
            steps.as_slice(),
            format!("{time_taken_ms:.3}"),
        ),
        Err(SolveError::Aborted { reason, steps }) => (
            format!("aborted ({reason})"),
            "-".to_string(),
            steps.as_slice(),
            "-".to_string(),
        ),
        Err(err @ SolveError::InvalidPuzzle(_)) => {
            (err.to_string(), "-".to_string(), &[][..], "-".to_string())
        }
    };

    Row::new(vec![
        Cell::new(&variant.to_string()),
        Cell::new(&label),
        Cell::new(&backtracks),
        Cell::new(&count_kind(steps, StepKind::Assignment).to_string()),
        Cell::new(&count_kind(steps, StepKind::ConstraintPropagation).to_string()),
        Cell::new(&count_kind(steps, StepKind::ArcConsistency).to_string()),
        Cell::new(&steps.len().to_string()),
        Cell::new(&time),
    ])
}

/// A one-row summary of a single solve run.
pub fn render_report_table(variant: SolverVariant, outcome: &Result<SolutionResult>) -> String {
    let mut table = Table::new();
    table.add_row(header());
    table.add_row(run_row(variant, outcome));
    table.to_string()
}

/// Both variants of a comparison run, side by side.
pub fn render_comparison_table(run: &ComparedRun) -> String {
    let mut table = Table::new();
    table.add_row(header());
    table.add_row(run_row(SolverVariant::Basic, &run.basic));
    table.add_row(run_row(SolverVariant::Optimized, &run.optimized));
    table.to_string()
}
