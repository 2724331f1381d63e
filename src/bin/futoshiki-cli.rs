use std::fs;
use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use futoshiki::api::{ErrorResponse, SolveRequest, SolveResponse};
use futoshiki::error::SolveError;
use futoshiki::puzzle::{CellPos, CellValue, Puzzle, Relation};
use futoshiki::solver::engine::{SolveOptions, SolverEngine, SolverVariant};
use futoshiki::solver::stats::{render_comparison_table, render_report_table};

/// Solve Futoshiki puzzles from JSON descriptions.
#[derive(Parser)]
#[command(name = "futoshiki-cli")]
struct Cli {
    /// Path to a JSON solve request (grid, constraints, gridSize,
    /// solverVariant).
    puzzle: PathBuf,

    /// Solver variant to run, overriding the request's solverVariant.
    #[arg(long, value_enum)]
    solver: Option<VariantArg>,

    /// Run both variants and print a side-by-side comparison.
    #[arg(long)]
    compare: bool,

    /// Print the full step trace.
    #[arg(long)]
    steps: bool,

    /// Skip grid snapshots in the trace; faster on large puzzles.
    #[arg(long)]
    no_snapshots: bool,

    /// Emit the raw JSON response instead of tables.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VariantArg {
    Basic,
    Optimized,
}

impl From<VariantArg> for SolverVariant {
    fn from(arg: VariantArg) -> Self {
        match arg {
            VariantArg::Basic => SolverVariant::Basic,
            VariantArg::Optimized => SolverVariant::Optimized,
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    if let Err(err) = run() {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run() -> Result<(), String> {
    let cli = Cli::parse();

    let raw = fs::read_to_string(&cli.puzzle)
        .map_err(|err| format!("cannot read {}: {err}", cli.puzzle.display()))?;
    let request: SolveRequest =
        serde_json::from_str(&raw).map_err(|err| format!("malformed request: {err}"))?;
    let puzzle = request.to_puzzle().map_err(|err| err.to_string())?;

    let options = SolveOptions {
        record_snapshots: !cli.no_snapshots,
        ..SolveOptions::default()
    };
    let engine = SolverEngine::new();

    if cli.compare {
        let run = engine.solve_compared_with_options(&puzzle, &options);
        if let Ok(result) = &run.basic {
            println!("{}", render_grid(&puzzle, &result.solution));
        } else if let Ok(result) = &run.optimized {
            println!("{}", render_grid(&puzzle, &result.solution));
        }
        print!("{}", render_comparison_table(&run));
        return Ok(());
    }

    let variant = cli
        .solver
        .map(SolverVariant::from)
        .unwrap_or(request.solver_variant);
    let outcome = engine.solve_with_options(&puzzle, variant, &options);

    if cli.json {
        let json = match outcome {
            Ok(result) => serde_json::to_string_pretty(&SolveResponse::from(result)),
            Err(err) => serde_json::to_string_pretty(&ErrorResponse::from(err)),
        }
        .map_err(|err| err.to_string())?;
        println!("{json}");
        return Ok(());
    }

    match &outcome {
        Ok(result) => {
            println!("{}", render_grid(&puzzle, &result.solution));
            if cli.steps {
                print_steps(result.steps.iter());
            }
        }
        Err(SolveError::Unsatisfiable { steps, .. }) => {
            println!("No solution exists.");
            if cli.steps {
                print_steps(steps.iter());
            }
        }
        Err(SolveError::Aborted { reason, .. }) => println!("Solve aborted: {reason}."),
        Err(err) => return Err(err.to_string()),
    }
    print!("{}", render_report_table(variant, &outcome));
    Ok(())
}

fn print_steps<'a>(steps: impl Iterator<Item = &'a futoshiki::solver::trace::SolutionStep>) {
    for (index, step) in steps.enumerate() {
        println!("{:>4}. {}", index + 1, step.description);
    }
}

/// Renders a solved grid with the puzzle's inequality glyphs between
/// adjacent cells.
fn render_grid(puzzle: &Puzzle, solution: &[Vec<CellValue>]) -> String {
    let n = puzzle.size();
    let relation_between = |a: CellPos, b: CellPos| -> Option<Relation> {
        puzzle
            .constraints()
            .iter()
            .find(|constraint| constraint.involves(a) && constraint.involves(b))
            .and_then(|constraint| constraint.oriented_from(a))
            .map(|(_, relation)| relation)
    };

    let mut out = String::new();
    for row in 0..n {
        for col in 0..n {
            out.push_str(&solution[row][col].to_string());
            if col + 1 < n {
                let glyph =
                    match relation_between(CellPos::new(row, col), CellPos::new(row, col + 1)) {
                        Some(Relation::Greater) => '>',
                        Some(Relation::Less) => '<',
                        None => ' ',
                    };
                out.push(' ');
                out.push(glyph);
                out.push(' ');
            }
        }
        out.push('\n');
        if row + 1 < n {
            for col in 0..n {
                let glyph =
                    match relation_between(CellPos::new(row, col), CellPos::new(row + 1, col)) {
                        Some(Relation::Greater) => 'v',
                        Some(Relation::Less) => '^',
                        None => ' ',
                    };
                out.push(glyph);
                if col + 1 < n {
                    out.push_str("   ");
                }
            }
            out.push('\n');
        }
    }
    out
}
