#![warn(missing_docs)]
//! This crate decides Boolean satisfiability of formulas in conjunctive
//! normal form, for embedding in programs that reduce combinatorial
//! problems (N-queens, Sudoku, grid puzzles) to SAT.
//!
//! The primary core is a watched-literal chronological-backtracking engine
//! over a flat, index-encoded clause store; a recursive simplify-and-branch
//! solver (with and without unit propagation) is included as a reference
//! that can also enumerate every model. Binomial cardinality encoders
//! round out the interface puzzle reductions need.
//!
//! ```
//! use chronosat::sat::cnf::Cnf;
//! use chronosat::sat::solver::Solver;
//! use chronosat::sat::watched::WatchedSolver;
//!
//! let cnf = Cnf::try_new(vec![vec![1, 2], vec![-1, 3], vec![-3, 4], vec![1]]).unwrap();
//! let model = WatchedSolver::new(cnf.clone()).solve().expect("satisfiable");
//! assert!(cnf.verify(&model));
//! ```

/// The `sat` module implements the SAT solver cores, the CNF data model,
/// and the cardinality encoders.
pub mod sat;
