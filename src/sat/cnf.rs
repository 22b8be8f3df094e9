#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The validated CNF container handed to every solver core.
//!
//! A formula is an ordered sequence of clauses over variables `1..=V`,
//! where `V` is the largest magnitude appearing in the input. Construction
//! performs the single validation scan: literals must be nonzero and in
//! range, and a zero-length clause marks the formula trivially
//! unsatisfiable and stops the scan, so no solver storage is ever
//! allocated for such input.
//!
//! Clause order is semantically irrelevant but preserved exactly: the
//! watched-literal engine keys its chains off clause indices, and the
//! reference solvers' enumeration order depends on it.

use crate::sat::clause::Clause;
use crate::sat::solver::{SolverError, Solutions};
use itertools::Itertools;
use std::fmt::Display;
use std::num::NonZeroI32;

/// A formula in conjunctive normal form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cnf {
    /// The clauses, in input order.
    pub clauses: Vec<Clause>,
    /// The number of variables `V`; variables are `1..=V`.
    pub num_vars: usize,
    empty_clause: bool,
}

impl Cnf {
    /// Validates and collects a formula from DIMACS clause lists.
    ///
    /// Scans the input once, computing the clause count, the total literal
    /// count and `V` along the way. A clause of length zero denotes
    /// unsatisfiability; it ends the scan immediately and the returned
    /// formula reports [`Self::has_empty_clause`].
    ///
    /// # Errors
    ///
    /// [`SolverError::ZeroLiteral`] or [`SolverError::LiteralOutOfRange`]
    /// when a literal fails the codec's checks.
    pub fn try_new<I, J>(clauses: I) -> Result<Self, SolverError>
    where
        I: IntoIterator<Item = J>,
        J: IntoIterator<Item = i32>,
    {
        let mut collected = Vec::new();
        let mut num_vars = 0usize;

        for clause in clauses {
            let clause: Clause = clause
                .into_iter()
                .map(crate::sat::literal::Lit::from_dimacs)
                .collect::<Result<_, _>>()?;

            if clause.is_empty() {
                return Ok(Self {
                    clauses: Vec::new(),
                    num_vars: 0,
                    empty_clause: true,
                });
            }

            num_vars = num_vars.max(clause.max_variable() as usize);
            collected.push(clause);
        }

        Ok(Self {
            clauses: collected,
            num_vars,
            empty_clause: false,
        })
    }

    /// `true` if the input contained a zero-length clause: the formula is
    /// unsatisfiable before any search.
    #[must_use]
    pub const fn has_empty_clause(&self) -> bool {
        self.empty_clause
    }

    /// The number of clauses `M`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    /// `true` for the clause-free formula, which every assignment satisfies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// The total number of literal occurrences `P`.
    #[must_use]
    pub fn num_lits(&self) -> usize {
        self.clauses.iter().map(Clause::len).sum()
    }

    /// Iterates the clauses in input order.
    pub fn iter(&self) -> impl Iterator<Item = &Clause> {
        self.clauses.iter()
    }

    /// Checks a model against the formula: every clause must contain at
    /// least one literal the model makes true.
    #[must_use]
    pub fn verify(&self, solutions: &Solutions) -> bool {
        !self.empty_clause
            && self.iter().all(|clause| {
                clause.iter().any(|lit| {
                    NonZeroI32::new(lit.to_dimacs())
                        .is_some_and(|nonzero| solutions.check(nonzero))
                })
            })
    }
}

impl Display for Cnf {
    /// Renders the formula in DIMACS CNF text form.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "p cnf {} {}", self.num_vars, self.len())?;
        for clause in &self.clauses {
            let body = clause.iter().map(|l| l.to_dimacs().to_string()).join(" ");
            if body.is_empty() {
                writeln!(f, "0")?;
            } else {
                writeln!(f, "{body} 0")?;
            }
        }
        Ok(())
    }
}

impl TryFrom<Vec<Vec<i32>>> for Cnf {
    type Error = SolverError;

    fn try_from(clauses: Vec<Vec<i32>>) -> Result<Self, Self::Error> {
        Self::try_new(clauses)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_from_scan() {
        let cnf = Cnf::try_new(vec![vec![1, -2], vec![-1, 2, 3], vec![3]]).unwrap();
        assert_eq!(cnf.len(), 3);
        assert_eq!(cnf.num_vars, 3);
        assert_eq!(cnf.num_lits(), 6);
        assert!(!cnf.has_empty_clause());
    }

    #[test]
    fn test_empty_clause_short_circuits() {
        let cnf = Cnf::try_new(vec![vec![1, 2], vec![], vec![0]]).unwrap();
        assert!(cnf.has_empty_clause());
        assert!(cnf.is_empty());
    }

    #[test]
    fn test_validation_failures() {
        assert_eq!(
            Cnf::try_new(vec![vec![1, 0]]),
            Err(SolverError::ZeroLiteral)
        );
        assert_eq!(
            Cnf::try_new(vec![vec![i32::MIN]]),
            Err(SolverError::LiteralOutOfRange { literal: i32::MIN })
        );
    }

    #[test]
    fn test_empty_formula_is_trivially_true() {
        let cnf = Cnf::try_new(Vec::<Vec<i32>>::new()).unwrap();
        assert!(cnf.is_empty());
        assert_eq!(cnf.num_vars, 0);
        assert!(cnf.verify(&Solutions::default()));
    }

    #[test]
    fn test_verify() {
        let cnf = Cnf::try_new(vec![vec![1, -2], vec![-1, 2, 3]]).unwrap();
        assert!(cnf.verify(&Solutions::new(&[1, -2, 3])));
        assert!(!cnf.verify(&Solutions::new(&[-1, 2, -3])));
    }

    #[test]
    fn test_display_dimacs() {
        let cnf = Cnf::try_new(vec![vec![1, -2], vec![2, 3]]).unwrap();
        let text = cnf.to_string();
        assert!(text.starts_with("p cnf 3 2\n"));
        assert!(text.contains("1 -2 0\n"));
        assert!(text.contains("2 3 0\n"));
    }

    #[test]
    fn test_tautologies_are_kept() {
        let cnf = Cnf::try_new(vec![vec![1, -1], vec![2, 2]]).unwrap();
        assert_eq!(cnf.len(), 2);
        assert_eq!(cnf.clauses[0].len(), 2);
        assert_eq!(cnf.clauses[1].len(), 2);
    }
}
