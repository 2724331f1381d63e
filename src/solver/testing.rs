//! Shared assertions and builders for solver tests.

use std::collections::BTreeSet;

use crate::puzzle::{CellValue, Puzzle};

/// Builds an optional-value grid from rows of plain numbers, with `0`
/// standing for an empty cell.
pub fn grid_from_rows(rows: &[&[CellValue]]) -> Vec<Vec<Option<CellValue>>> {
    rows.iter()
        .map(|row| {
            row.iter()
                .map(|&value| (value != 0).then_some(value))
                .collect()
        })
        .collect()
}

/// Asserts the full §8-style solution contract: every row and column is a
/// permutation of `1..=N`, every given is preserved, and every inequality
/// constraint holds.
pub fn assert_valid_solution(puzzle: &Puzzle, solution: &[Vec<CellValue>]) {
    let n = puzzle.size();
    let expected: BTreeSet<CellValue> = (1..=n as CellValue).collect();

    assert_eq!(solution.len(), n, "wrong row count");
    for (row, cells) in solution.iter().enumerate() {
        let values: BTreeSet<CellValue> = cells.iter().copied().collect();
        assert_eq!(values, expected, "row {row} is not a permutation");
    }
    for col in 0..n {
        let values: BTreeSet<CellValue> = solution.iter().map(|row| row[col]).collect();
        assert_eq!(values, expected, "column {col} is not a permutation");
    }

    for (pos, value) in puzzle.givens() {
        assert_eq!(
            solution[pos.row][pos.col], value,
            "given at {pos} was not preserved"
        );
    }

    for constraint in puzzle.constraints() {
        let a = solution[constraint.position_a.row][constraint.position_a.col];
        let b = solution[constraint.position_b.row][constraint.position_b.col];
        assert!(
            constraint.holds(a, b),
            "constraint {} {} {} violated: {a} vs {b}",
            constraint.position_a,
            constraint.relation,
            constraint.position_b,
        );
    }
}
