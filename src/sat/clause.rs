#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The clause type: an ordered, possibly redundant disjunction of literals.
//!
//! Literals are stored inline for short clauses via `SmallVec`. Duplicate
//! literals and tautologies (a literal next to its own negation) are
//! tolerated and kept exactly as given; the solver cores treat them
//! correctly without normalisation, and slot order is meaningful to the
//! watched-literal engine.

use crate::sat::literal::{Lit, Variable};
use crate::sat::solver::SolverError;
use rustc_hash::FxHashSet;
use smallvec::SmallVec;
use std::ops::Index;

/// An ordered disjunction of literals.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Clause {
    /// The literals, in the order the caller gave them.
    pub literals: SmallVec<[Lit; 8]>,
}

impl Clause {
    /// Creates a clause from a slice of literals, preserving order and
    /// duplicates.
    #[must_use]
    pub fn new(literals: &[Lit]) -> Self {
        Self {
            literals: SmallVec::from_slice(literals),
        }
    }

    /// Creates a clause from signed DIMACS literals.
    ///
    /// # Errors
    ///
    /// Propagates the codec's validation failures (zero or out-of-range
    /// literals).
    pub fn try_from_dimacs(clause: &[i32]) -> Result<Self, SolverError> {
        let literals = clause
            .iter()
            .map(|&value| Lit::from_dimacs(value))
            .collect::<Result<_, _>>()?;
        Ok(Self { literals })
    }

    /// The number of literal occurrences (duplicates counted).
    #[must_use]
    pub fn len(&self) -> usize {
        self.literals.len()
    }

    /// `true` for the empty clause, which no assignment satisfies.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// `true` for a clause with a single literal occurrence.
    #[must_use]
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }

    /// `true` if the clause contains a literal and its negation.
    #[must_use]
    pub fn is_tautology(&self) -> bool {
        let mut seen = FxHashSet::default();
        for &lit in &self.literals {
            if seen.contains(&lit.negated()) {
                return true;
            }
            seen.insert(lit);
        }
        false
    }

    /// The largest variable mentioned, or 0 for the empty clause.
    #[must_use]
    pub fn max_variable(&self) -> Variable {
        self.literals
            .iter()
            .map(|l| l.variable())
            .max()
            .unwrap_or_default()
    }

    /// Iterates the literals in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &Lit> {
        self.literals.iter()
    }
}

impl Index<usize> for Clause {
    type Output = Lit;

    fn index(&self, index: usize) -> &Self::Output {
        &self.literals[index]
    }
}

impl AsRef<[Lit]> for Clause {
    fn as_ref(&self) -> &[Lit] {
        &self.literals
    }
}

impl FromIterator<Lit> for Clause {
    fn from_iter<I: IntoIterator<Item = Lit>>(iter: I) -> Self {
        Self {
            literals: iter.into_iter().collect(),
        }
    }
}
