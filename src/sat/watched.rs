#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The watched-literal backtracking engine.
//!
//! Each clause is watched by exactly one literal, the literal in its first
//! slot, and for every literal code the clauses watching it form a singly
//! linked chain threaded through a per-clause `next` array. When a
//! decision falsifies a literal, every clause watching it must either adopt
//! a replacement watch (swapped into the first slot, clause respliced onto
//! the replacement's chain in O(1)) or force the decision to be retried.
//!
//! Backtracking never undoes watch motion. The invariant that makes this
//! sound: a clause's watched literal is never false under the current
//! partial assignment. A replacement adopted at some depth is unassigned or
//! true there; retreating only unassigns variables, and the one operation
//! that could falsify it, flipping its variable's phase, happens only at
//! that variable's own depth, which re-runs the watch migration for the
//! flipped literal first.
//!
//! The search itself is plain chronological backtracking over variables in
//! numeric order: no propagation, no learning, no restarts. The phase tried
//! first at each depth is chosen from the watch heads, preferring the
//! polarity that can still falsify some clause's watch.

use crate::sat::cnf::Cnf;
use crate::sat::store::FlatFormula;
use crate::sat::solver::{Solutions, Solver};

/// The dispatch states of the search loop.
///
/// `Choose` both detects success and picks the next decision; watch
/// migration for the falsified complement happens in `RemoveWatches`;
/// `TryAgain` flips the phase at the current depth; `Backtrack` retreats
/// one level. There are no other edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Choose,
    RemoveWatches,
    TryAgain,
    Backtrack,
}

/// A single-shot decision procedure over a fixed formula.
///
/// All storage is sized on construction and only mutated by [`Self::solve`].
/// Identical input yields identical output, including the model chosen.
#[derive(Debug, Clone)]
pub struct WatchedSolver {
    formula: FlatFormula,
    /// Chain heads per literal code; `num_clauses` is the empty sentinel.
    watch: Vec<usize>,
    /// Chain links per clause; `num_clauses` terminates a chain.
    next: Vec<usize>,
    /// Per-depth phase record. The low bit is the phase currently tried
    /// (0 positive, 1 negative); values 2 and 3 mean both phases tried.
    moves: Vec<u8>,
    num_vars: usize,
    trivially_unsat: bool,
}

impl Solver for WatchedSolver {
    fn new(cnf: Cnf) -> Self {
        let trivially_unsat = cnf.has_empty_clause();
        let formula = FlatFormula::new(&cnf);
        let (watch, next) = formula.thread_watches(cnf.num_vars);

        Self {
            formula,
            watch,
            next,
            moves: vec![0; cnf.num_vars],
            num_vars: cnf.num_vars,
            trivially_unsat,
        }
    }

    fn solve(&mut self) -> Option<Solutions> {
        if self.trivially_unsat {
            return None;
        }

        let m = self.formula.num_clauses();
        let mut depth = 0usize;
        let mut literal = 0u32;
        let mut step = Step::Choose;

        loop {
            match step {
                Step::Choose => {
                    #[cfg(debug_assertions)]
                    self.check_watch_invariants(depth);

                    if depth == self.num_vars {
                        return Some(self.extract_model());
                    }
                    // Prefer the positive phase unless nothing watches it
                    // or something watches its complement.
                    let negative =
                        self.watch[2 * depth] >= m || self.watch[2 * depth + 1] < m;
                    self.moves[depth] = u8::from(negative);
                    literal = Self::decision_literal(depth, self.moves[depth]);
                    log::trace!("decide {} at depth {depth}", dimacs(literal));
                    step = Step::RemoveWatches;
                }
                Step::RemoveWatches => {
                    if self.migrate_watchers(literal, depth) {
                        self.watch[(literal ^ 1) as usize] = m;
                        depth += 1;
                        step = Step::Choose;
                    } else {
                        step = Step::TryAgain;
                    }
                }
                Step::TryAgain => {
                    if self.moves[depth] < 2 {
                        self.moves[depth] ^= 3;
                        literal = Self::decision_literal(depth, self.moves[depth]);
                        log::trace!("retry {} at depth {depth}", dimacs(literal));
                        step = Step::RemoveWatches;
                    } else {
                        step = Step::Backtrack;
                    }
                }
                Step::Backtrack => {
                    if depth == 0 {
                        log::debug!("both phases exhausted at the root: unsatisfiable");
                        return None;
                    }
                    depth -= 1;
                    step = Step::TryAgain;
                }
            }
        }
    }
}

impl WatchedSolver {
    /// The decision literal at `depth` under a phase record.
    #[allow(clippy::cast_possible_truncation)]
    const fn decision_literal(depth: usize, phase: u8) -> u32 {
        (2 * depth) as u32 | (phase & 1) as u32
    }

    /// Drains the chain of clauses watching the complement of `literal`.
    ///
    /// Each clause scans its remaining slots for a literal that is not
    /// false at `depth`; on success that literal is swapped into the first
    /// slot and the clause is spliced onto the head of its chain. Returns
    /// `false` when some clause has no replacement, meaning the decision
    /// cannot stand; the stuck clause and the rest of its chain are left
    /// intact under the complement's head.
    fn migrate_watchers(&mut self, literal: u32, depth: usize) -> bool {
        let falsified = (literal ^ 1) as usize;
        let m = self.formula.num_clauses();
        let mut j = self.watch[falsified];

        while j < m {
            let (lo, hi) = self.formula.bounds(j);
            let successor = self.next[j];
            let mut adopted = false;

            for k in lo + 1..hi {
                let candidate = self.formula.slot(k);
                if self.not_false(candidate, depth) {
                    self.formula.swap_slots(lo, k);
                    self.next[j] = self.watch[candidate as usize];
                    self.watch[candidate as usize] = j;
                    adopted = true;
                    break;
                }
            }

            if !adopted {
                self.watch[falsified] = j;
                return false;
            }
            j = successor;
        }

        true
    }

    /// Whether a literal code is not false while the decision at `depth` is
    /// in force: its variable is deeper than `depth` (unassigned) or its
    /// polarity agrees with the phase recorded for it.
    fn not_false(&self, code: u32, depth: usize) -> bool {
        let var = (code >> 1) as usize;
        var > depth || (code + u32::from(self.moves[var])) & 1 == 0
    }

    /// Decodes the phase records into signed DIMACS form.
    fn extract_model(&self) -> Solutions {
        let values = (1..=self.num_vars)
            .map(|k| {
                #[allow(clippy::cast_possible_wrap, clippy::cast_possible_truncation)]
                let k = k as i32;
                k * (1 - 2 * i32::from(self.moves[k as usize - 1] & 1))
            })
            .collect::<Vec<_>>();
        Solutions::new(&values)
    }

    /// Asserts the watch structure's health at a `Choose` entry: every
    /// clause is watched by its first literal, appears on exactly one
    /// chain, chains are acyclic, and no watched literal is false under
    /// the phases at depths below `depth`.
    #[cfg(debug_assertions)]
    fn check_watch_invariants(&self, depth: usize) {
        let m = self.formula.num_clauses();
        let mut seen = vec![false; m];

        for head in 0..self.watch.len() {
            let mut j = self.watch[head];
            let mut hops = 0usize;
            while j < m {
                let (lo, _) = self.formula.bounds(j);
                assert_eq!(
                    self.formula.slot(lo) as usize,
                    head,
                    "clause {j} chained under a literal it does not watch"
                );
                assert!(!seen[j], "clause {j} appears on two watch chains");
                seen[j] = true;
                hops += 1;
                assert!(hops <= m, "watch chain cycle through clause {j}");
                j = self.next[j];
            }
        }
        assert!(
            seen.iter().all(|&s| s),
            "some clause is missing from every watch chain"
        );

        for j in 0..m {
            let (lo, _) = self.formula.bounds(j);
            let code = self.formula.slot(lo);
            let var = (code >> 1) as usize;
            assert!(
                var >= depth || (code + u32::from(self.moves[var])) & 1 == 0,
                "clause {j} watches a false literal"
            );
        }
    }
}

/// Signed rendering of an internal code, for trace output.
#[allow(clippy::cast_possible_wrap)]
fn dimacs(code: u32) -> i32 {
    let var = (code >> 1) as i32 + 1;
    if code & 1 == 1 {
        -var
    } else {
        var
    }
}
