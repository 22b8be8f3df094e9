#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! Binomial cardinality encoders over signed DIMACS literals.
//!
//! `at_most(k, ls)` forbids every way of making `k + 1` of the literals
//! true; `at_least(k, ls)` forbids every way of making more than `n - k`
//! of them false. The clause lists therefore have C(n, k+1) and
//! C(n, n-k+1) entries respectively, quadratic already for `k = 1`, so
//! these are meant for the small literal sets that puzzle encodings
//! produce.
//!
//! Subsets are emitted in lexicographic index order, which is the order
//! `Itertools::combinations` walks them in; callers may rely on the exact
//! clause sequence.

use itertools::Itertools;

/// Clauses asserting that at most `k` of the literals are true.
///
/// One clause per `(k + 1)`-subset, containing the subset's negations.
/// Empty when `k >= literals.len()` (the constraint is vacuous).
#[must_use]
pub fn at_most(k: usize, literals: &[i32]) -> Vec<Vec<i32>> {
    if k >= literals.len() {
        return Vec::new();
    }
    literals
        .iter()
        .copied()
        .combinations(k + 1)
        .map(|subset| subset.into_iter().map(|l| -l).collect())
        .collect()
}

/// Clauses asserting that at least `k` of the literals are true.
///
/// One clause per `(n - k + 1)`-subset, containing the subset itself.
/// Empty when `k == 0` (vacuous) or `k > literals.len()`.
#[must_use]
pub fn at_least(k: usize, literals: &[i32]) -> Vec<Vec<i32>> {
    let n = literals.len();
    if k == 0 || k > n {
        return Vec::new();
    }
    literals
        .iter()
        .copied()
        .combinations(n - k + 1)
        .collect()
}

/// Clauses asserting that exactly `k` of the literals are true: the
/// concatenation of [`at_most`] and [`at_least`].
#[must_use]
pub fn exactly(k: usize, literals: &[i32]) -> Vec<Vec<i32>> {
    let mut clauses = at_most(k, literals);
    clauses.extend(at_least(k, literals));
    clauses
}
