//! Boundary-facing request/response types with the normalized field names
//! expected by external callers. No transport lives here; a server or CLI
//! deserializes a [`SolveRequest`], calls the engine, and serializes the
//! outcome unchanged.

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, SolveError};
use crate::puzzle::{CellPos, CellValue, InequalityConstraint, Puzzle, Relation};
use crate::solver::engine::{SolutionResult, SolverVariant};
use crate::solver::trace::SolutionStep;

/// One inequality constraint as supplied by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConstraintSpec {
    pub relation: Relation,
    pub position_a: CellPos,
    pub position_b: CellPos,
}

impl From<ConstraintSpec> for InequalityConstraint {
    fn from(spec: ConstraintSpec) -> Self {
        InequalityConstraint::new(spec.position_a, spec.position_b, spec.relation)
    }
}

/// A solve request: the grid, its size, the constraints, and which variant
/// to run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveRequest {
    pub grid: Vec<Vec<Option<CellValue>>>,
    pub constraints: Vec<ConstraintSpec>,
    pub grid_size: usize,
    pub solver_variant: SolverVariant,
}

impl SolveRequest {
    /// Validates the request into an engine [`Puzzle`].
    pub fn to_puzzle(&self) -> Result<Puzzle, PuzzleError> {
        Puzzle::new(
            self.grid_size,
            self.grid.clone(),
            self.constraints
                .iter()
                .map(|&spec| spec.into())
                .collect(),
        )
    }
}

/// A successful solve, serialized for the caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SolveResponse {
    pub solution: Vec<Vec<CellValue>>,
    pub backtracks: u64,
    /// Elapsed wall-clock time in milliseconds.
    pub time_taken: f64,
    pub steps: Vec<SolutionStep>,
}

impl From<SolutionResult> for SolveResponse {
    fn from(result: SolutionResult) -> Self {
        Self {
            solution: result.solution,
            backtracks: result.backtracks,
            time_taken: result.time_taken_ms,
            steps: result.steps,
        }
    }
}

/// The error payload callers receive instead of a partial result.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// Machine-checkable kind: `invalid_puzzle`, `unsatisfiable` or
    /// `solve_aborted`.
    pub kind: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backtracks: Option<u64>,
    /// The trace up to the failure, so callers can explain why.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<SolutionStep>>,
}

impl From<SolveError> for ErrorResponse {
    fn from(error: SolveError) -> Self {
        let kind = error.kind().to_string();
        let message = error.to_string();
        match error {
            SolveError::InvalidPuzzle(_) => Self {
                kind,
                message,
                backtracks: None,
                steps: None,
            },
            SolveError::Unsatisfiable {
                backtracks, steps, ..
            } => Self {
                kind,
                message,
                backtracks: Some(backtracks),
                steps: Some(steps),
            },
            SolveError::Aborted { steps, .. } => Self {
                kind,
                message,
                backtracks: None,
                steps: Some(steps),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::solver::engine::SolverEngine;

    fn request_json() -> serde_json::Value {
        serde_json::json!({
            "grid": [[null, null, 1], [null, null, null], [1, null, null]],
            "constraints": [
                {
                    "relation": "greater",
                    "positionA": {"row": 0, "col": 0},
                    "positionB": {"row": 0, "col": 1}
                },
                {
                    "relation": "less",
                    "positionA": {"row": 1, "col": 1},
                    "positionB": {"row": 2, "col": 1}
                }
            ],
            "gridSize": 3,
            "solverVariant": "optimized"
        })
    }

    #[test]
    fn request_deserializes_normalized_field_names() {
        let request: SolveRequest = serde_json::from_value(request_json()).unwrap();
        assert_eq!(request.grid_size, 3);
        assert_eq!(request.solver_variant, SolverVariant::Optimized);
        assert_eq!(request.constraints.len(), 2);
        assert_eq!(request.constraints[0].relation, Relation::Greater);
        assert_eq!(request.constraints[0].position_a, CellPos::new(0, 0));
    }

    #[test]
    fn request_round_trips_through_the_engine() {
        let request: SolveRequest = serde_json::from_value(request_json()).unwrap();
        let puzzle = request.to_puzzle().unwrap();
        let result = SolverEngine::new()
            .solve(&puzzle, request.solver_variant)
            .unwrap();
        let response = SolveResponse::from(result);
        assert_eq!(response.solution[0], vec![3, 2, 1]);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("timeTaken").is_some());
        assert!(json.get("steps").unwrap().is_array());
    }

    #[test]
    fn invalid_request_surfaces_a_puzzle_error() {
        let mut json = request_json();
        json["gridSize"] = serde_json::json!(1);
        json["grid"] = serde_json::json!([[null]]);
        json["constraints"] = serde_json::json!([]);
        let request: SolveRequest = serde_json::from_value(json).unwrap();
        assert_eq!(
            request.to_puzzle().unwrap_err(),
            PuzzleError::SizeTooSmall { size: 1 }
        );
    }

    #[test]
    fn error_response_carries_kind_and_trace() {
        let grid = vec![
            vec![Some(2), Some(2)],
            vec![None, None],
        ];
        let puzzle = Puzzle::new(2, grid, Vec::new()).unwrap();
        let err = SolverEngine::new()
            .solve(&puzzle, SolverVariant::Basic)
            .unwrap_err();
        let response = ErrorResponse::from(err);
        assert_eq!(response.kind, "unsatisfiable");
        assert!(response.backtracks.unwrap() >= 1);
        assert!(!response.steps.unwrap().is_empty());
    }
}
