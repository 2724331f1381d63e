//! A Futoshiki solving engine with replayable search traces.
//!
//! Futoshiki is an NxN Latin-square puzzle with strict inequality
//! constraints between pairs of cells. This crate models a puzzle instance,
//! solves it with one of two interchangeable strategies, and records every
//! search decision as an ordered, replayable step trace.
//!
//! # Core Concepts
//!
//! - **[`Puzzle`](puzzle::Puzzle)**: the immutable instance — size, givens,
//!   and inequality constraints.
//! - **[`SolverVariant`](solver::engine::SolverVariant)**: `Basic` is plain
//!   depth-first backtracking; `Optimized` adds MRV/LCV heuristics and
//!   constraint propagation to a fixpoint.
//! - **[`SolverEngine`](solver::engine::SolverEngine)**: the entry point.
//!   Each solve call owns its own state, so independent calls can run in
//!   parallel.
//!
//! # Example
//!
//! ```
//! use futoshiki::puzzle::{CellPos, InequalityConstraint, Puzzle, Relation};
//! use futoshiki::solver::engine::{SolverEngine, SolverVariant};
//!
//! let grid = vec![
//!     vec![None, None, Some(1)],
//!     vec![None, None, None],
//!     vec![Some(1), None, None],
//! ];
//! let constraints = vec![
//!     InequalityConstraint::new(CellPos::new(0, 0), CellPos::new(0, 1), Relation::Greater),
//!     InequalityConstraint::new(CellPos::new(1, 1), CellPos::new(2, 1), Relation::Less),
//! ];
//! let puzzle = Puzzle::new(3, grid, constraints).unwrap();
//!
//! let result = SolverEngine::new()
//!     .solve(&puzzle, SolverVariant::Optimized)
//!     .unwrap();
//!
//! assert_eq!(result.solution[0], vec![3, 2, 1]);
//! assert_eq!(result.backtracks, 0);
//! ```

pub mod api;
pub mod error;
pub mod puzzle;
pub mod solver;
