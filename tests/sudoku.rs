//! The Sudoku reduction, written as an external collaborator: cells become
//! one-hot digit variables, units get pairwise exclusivity clauses, and
//! givens become unit clauses.

use chronosat::sat::cardinality::{at_most, exactly};
use chronosat::sat::cnf::Cnf;
use chronosat::sat::dpll::PropagatingDpll;
use chronosat::sat::solver::{Solutions, Solver};
use std::num::NonZeroI32;

/// The variable for digit `d` in row `r`, column `c` (`r`, `c` 0-based,
/// `d` in `1..=9`).
fn cell(r: usize, c: usize, d: usize) -> i32 {
    (81 * r + 9 * c + d) as i32
}

/// Encodes the rules plus the given clues of a 81-character grid string
/// (`0` for an empty cell, row-major).
fn sudoku_cnf(grid: &str) -> Vec<Vec<i32>> {
    let mut clauses = Vec::new();

    for r in 0..9 {
        for c in 0..9 {
            let digits: Vec<i32> = (1..=9).map(|d| cell(r, c, d)).collect();
            clauses.extend(exactly(1, &digits));
        }
    }
    for d in 1..=9 {
        for r in 0..9 {
            let row: Vec<i32> = (0..9).map(|c| cell(r, c, d)).collect();
            clauses.extend(at_most(1, &row));
        }
        for c in 0..9 {
            let col: Vec<i32> = (0..9).map(|r| cell(r, c, d)).collect();
            clauses.extend(at_most(1, &col));
        }
        for br in 0..3 {
            for bc in 0..3 {
                let block: Vec<i32> = (0..9)
                    .map(|i| cell(3 * br + i / 3, 3 * bc + i % 3, d))
                    .collect();
                clauses.extend(at_most(1, &block));
            }
        }
    }

    for (i, ch) in grid.bytes().enumerate() {
        if ch != b'0' {
            clauses.push(vec![cell(i / 9, i % 9, usize::from(ch - b'0'))]);
        }
    }

    clauses
}

/// Reads the solved grid back out of a model.
fn decode(model: &Solutions) -> String {
    let mut out = String::with_capacity(81);
    for r in 0..9 {
        for c in 0..9 {
            let digit = (1..=9)
                .find(|&d| model.check(NonZeroI32::new(cell(r, c, d)).unwrap()))
                .expect("every cell holds a digit");
            out.push(char::from(b'0' + digit as u8));
        }
    }
    out
}

/// Checks that `solved` completes `grid` and respects the Sudoku rules.
fn assert_valid_completion(grid: &str, solved: &str) {
    for (given, got) in grid.bytes().zip(solved.bytes()) {
        assert!(got.is_ascii_digit() && got != b'0');
        if given != b'0' {
            assert_eq!(given, got, "a given cell was changed");
        }
    }
    let digit = |r: usize, c: usize| solved.as_bytes()[9 * r + c];
    for i in 0..9 {
        for d in b'1'..=b'9' {
            assert!((0..9).any(|c| digit(i, c) == d), "row {i} misses {d}");
            assert!((0..9).any(|r| digit(r, i) == d), "column {i} misses {d}");
            assert!(
                (0..9).any(|k| digit(3 * (i / 3) + k / 3, 3 * (i % 3) + k % 3) == d),
                "block {i} misses {d}"
            );
        }
    }
}

const WIKIPEDIA: &str =
    "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

const SEVENTEEN_CLUES: &str =
    "000000010400000000020000000000050407008000300001090000300400200050100000000806000";

#[test]
fn moderate_puzzle_solves_by_propagation_alone() {
    let formula = Cnf::try_new(sudoku_cnf(WIKIPEDIA)).unwrap();
    let model = PropagatingDpll::new(formula.clone()).solve_any().unwrap();
    assert!(formula.verify(&model));

    let solved = decode(&model);
    assert_eq!(
        solved,
        "534678912672195348198342567859761423426853791713924856961537284287419635345286179"
    );
    assert_valid_completion(WIKIPEDIA, &solved);
}

#[test]
fn seventeen_clue_puzzle_has_its_unique_grid() {
    let formula = Cnf::try_new(sudoku_cnf(SEVENTEEN_CLUES)).unwrap();
    let model = PropagatingDpll::new(formula.clone()).solve_any().unwrap();
    assert!(formula.verify(&model));

    let solved = decode(&model);
    assert_eq!(
        solved,
        "693784512487512936125963874932651487568247391741398625319475268856129743274836159"
    );
    assert_valid_completion(SEVENTEEN_CLUES, &solved);
}
