#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
//! The reference recursive solvers: plain simplify-and-branch, and a
//! unit-propagating variant over a precomputed adjacency index.
//!
//! These cores trade the watched engine's in-place machinery for the
//! textbook recursive formulation, and in exchange they can enumerate
//! every model: [`Dpll::models`] is a lazy stream, [`Dpll::solve_all`] and
//! [`PropagatingDpll::solve_all`] collect it.
//!
//! Both cores enumerate in the same committed order: the branch literal is
//! the first literal of the first live clause, its own phase is explored
//! before its negation, and variables left unconstrained at a satisfied
//! leaf are expanded in ascending order with the positive phase first.
//! Models are total assignments over `1..=V`.

use crate::sat::clause::Clause;
use crate::sat::cnf::Cnf;
use crate::sat::literal::Lit;
use crate::sat::solver::{Solutions, Solver};
use smallvec::SmallVec;

/// Simplifies a formula under a branch literal.
///
/// Clauses containing the literal are satisfied and dropped; the literal's
/// negation is struck from the rest. `None`, the null formula sentinel,
/// signals that some clause lost its last literal, i.e. the branch is
/// locally unsatisfiable.
fn simplify(clauses: &[Clause], branch: Lit) -> Option<Vec<Clause>> {
    let negated = branch.negated();
    let mut reduced = Vec::with_capacity(clauses.len());

    for clause in clauses {
        if clause.iter().any(|&l| l == branch) {
            continue;
        }
        let kept: SmallVec<[Lit; 8]> = clause
            .iter()
            .copied()
            .filter(|&l| l != negated)
            .collect();
        if kept.is_empty() {
            return None;
        }
        reduced.push(Clause { literals: kept });
    }

    Some(reduced)
}

/// How much of a frame's branch pair remains to explore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Branch {
    /// The literal's own phase has not been tried yet.
    Own,
    /// The own phase is done; the negation is still pending.
    AlternatePending,
    /// Both phases explored; the frame can be popped.
    Exhausted,
}

/// One level of the lazy search: the formula as simplified so far, the
/// decisions that produced it, and the branch literal with its
/// alternate-branch-pending flag.
#[derive(Debug, Clone)]
struct Frame {
    clauses: Vec<Clause>,
    assignment: Vec<Lit>,
    literal: Lit,
    state: Branch,
}

impl Frame {
    fn new(clauses: Vec<Clause>, assignment: Vec<Lit>) -> Self {
        let literal = clauses[0][0];
        Self {
            clauses,
            assignment,
            literal,
            state: Branch::Own,
        }
    }
}

/// Expands the variables a satisfied leaf left unconstrained.
///
/// Works like a binary odometer over the free variables in ascending
/// order, positive phase first, rightmost variable varying fastest; each
/// position yields one total model.
#[derive(Debug, Clone)]
struct Completion {
    base: Vec<i32>,
    free: Vec<u32>,
    negative: Vec<bool>,
    done: bool,
}

impl Completion {
    fn new(assignment: &[Lit], num_vars: usize) -> Self {
        let mut assigned = vec![false; num_vars];
        for lit in assignment {
            assigned[lit.var_index()] = true;
        }
        #[allow(clippy::cast_possible_truncation)]
        let free: Vec<u32> = (1..=num_vars as u32)
            .filter(|&v| !assigned[(v - 1) as usize])
            .collect();
        let negative = vec![false; free.len()];

        Self {
            base: assignment.iter().map(|l| l.to_dimacs()).collect(),
            free,
            negative,
            done: false,
        }
    }

    fn next_model(&mut self) -> Option<Solutions> {
        if self.done {
            return None;
        }

        let mut values = self.base.clone();
        values.extend(
            self.free
                .iter()
                .zip(&self.negative)
                .map(|(&v, &negative)| {
                    #[allow(clippy::cast_possible_wrap)]
                    let v = v as i32;
                    if negative {
                        -v
                    } else {
                        v
                    }
                }),
        );
        let model = Solutions::new(&values);

        // advance the odometer: flip the rightmost positive, reset the tail
        match self.negative.iter().rposition(|&negative| !negative) {
            Some(i) => {
                self.negative[i] = true;
                for phase in &mut self.negative[i + 1..] {
                    *phase = false;
                }
            }
            None => self.done = true,
        }

        Some(model)
    }
}

/// A lazy stream of every model of a formula, in the committed order.
///
/// The internal state is an explicit stack of [`Frame`]s plus at most one
/// in-progress free-variable [`Completion`]; nothing is materialised ahead
/// of demand.
#[derive(Debug, Clone)]
pub struct Models {
    stack: Vec<Frame>,
    completion: Option<Completion>,
    num_vars: usize,
}

impl Models {
    fn new(clauses: Vec<Clause>, num_vars: usize, trivially_unsat: bool) -> Self {
        let mut models = Self {
            stack: Vec::new(),
            completion: None,
            num_vars,
        };
        if trivially_unsat {
            return models;
        }
        if clauses.is_empty() {
            models.completion = Some(Completion::new(&[], num_vars));
        } else {
            models.stack.push(Frame::new(clauses, Vec::new()));
        }
        models
    }
}

impl Iterator for Models {
    type Item = Solutions;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(completion) = &mut self.completion {
                if let Some(model) = completion.next_model() {
                    return Some(model);
                }
                self.completion = None;
            }

            let top = self.stack.len().checked_sub(1)?;
            let branch = {
                let frame = &mut self.stack[top];
                match frame.state {
                    Branch::Own => {
                        frame.state = Branch::AlternatePending;
                        Some(frame.literal)
                    }
                    Branch::AlternatePending => {
                        frame.state = Branch::Exhausted;
                        Some(frame.literal.negated())
                    }
                    Branch::Exhausted => None,
                }
            };
            let Some(branch) = branch else {
                self.stack.pop();
                continue;
            };

            let frame = &self.stack[top];
            let Some(reduced) = simplify(&frame.clauses, branch) else {
                continue;
            };
            let mut assignment = frame.assignment.clone();
            assignment.push(branch);

            if reduced.is_empty() {
                self.completion = Some(Completion::new(&assignment, self.num_vars));
            } else {
                self.stack.push(Frame::new(reduced, assignment));
            }
        }
    }
}

/// The plain simplify-and-branch solver, without unit propagation.
///
/// Branches recreate the formula by simplification, so each level of the
/// search owns an independent copy; recursion (and the [`Models`] stack)
/// is bounded by the variable count.
#[derive(Debug, Clone)]
pub struct Dpll {
    clauses: Vec<Clause>,
    num_vars: usize,
    trivially_unsat: bool,
}

impl Solver for Dpll {
    fn new(cnf: Cnf) -> Self {
        Self {
            trivially_unsat: cnf.has_empty_clause(),
            num_vars: cnf.num_vars,
            clauses: cnf.clauses,
        }
    }

    fn solve(&mut self) -> Option<Solutions> {
        self.solve_any()
    }
}

impl Dpll {
    /// The lazy model stream.
    #[must_use]
    pub fn models(&self) -> Models {
        Models::new(self.clauses.clone(), self.num_vars, self.trivially_unsat)
    }

    /// The first model in enumeration order, or `None` when unsatisfiable.
    pub fn solve_any(&mut self) -> Option<Solutions> {
        self.models().next()
    }

    /// Every model, in enumeration order. Empty means unsatisfiable.
    pub fn solve_all(&mut self) -> Vec<Solutions> {
        self.models().collect()
    }
}

/// A reversible effect of one assignment, for backtracking.
#[derive(Debug, Clone, Copy)]
enum Change {
    /// The clause became satisfied.
    Satisfied(usize),
    /// The clause lost this many falsified literal occurrences.
    Shrunk(usize, u32),
}

/// The unit-propagating variant of the reference solver.
///
/// Instead of rebuilding the formula, assignments are applied in place
/// through an adjacency index (for each variable, the ascending list of
/// clauses it occurs in), so an assignment touches only incident clauses.
/// Every effect lands in a journal and is rolled back on backtrack. Before
/// branching, unit clauses are propagated to closure.
#[derive(Debug, Clone)]
pub struct PropagatingDpll {
    clauses: Vec<Clause>,
    adjacency: Vec<Vec<usize>>,
    satisfied: Vec<bool>,
    open: Vec<u32>,
    values: Vec<Option<bool>>,
    trail: Vec<usize>,
    journal: Vec<Change>,
    num_vars: usize,
    trivially_unsat: bool,
}

impl Solver for PropagatingDpll {
    fn new(cnf: Cnf) -> Self {
        let mut adjacency = vec![Vec::new(); cnf.num_vars];
        for (i, clause) in cnf.iter().enumerate() {
            for lit in clause.iter() {
                let incident = &mut adjacency[lit.var_index()];
                if incident.last() != Some(&i) {
                    incident.push(i);
                }
            }
        }

        let satisfied = vec![false; cnf.len()];
        #[allow(clippy::cast_possible_truncation)]
        let open = cnf.iter().map(|c| c.len() as u32).collect();

        Self {
            adjacency,
            satisfied,
            open,
            values: vec![None; cnf.num_vars],
            trail: Vec::new(),
            journal: Vec::new(),
            num_vars: cnf.num_vars,
            trivially_unsat: cnf.has_empty_clause(),
            clauses: cnf.clauses,
        }
    }

    fn solve(&mut self) -> Option<Solutions> {
        self.solve_any()
    }
}

impl PropagatingDpll {
    /// The first model in enumeration order, or `None` when unsatisfiable.
    pub fn solve_any(&mut self) -> Option<Solutions> {
        if self.trivially_unsat {
            return None;
        }
        self.reset();
        let seed = self.initial_units();
        if self.search(seed) {
            let model = Completion::new(&self.assigned_literals(), self.num_vars)
                .next_model()
                .expect("a fresh completion always yields a model");
            Some(model)
        } else {
            None
        }
    }

    /// Every model, in the same order as [`Dpll::solve_all`].
    pub fn solve_all(&mut self) -> Vec<Solutions> {
        if self.trivially_unsat {
            return Vec::new();
        }
        self.reset();
        let seed = self.initial_units();
        let mut out = Vec::new();
        self.enumerate(seed, &mut out);
        out
    }

    fn reset(&mut self) {
        self.satisfied.fill(false);
        #[allow(clippy::cast_possible_truncation)]
        for (slot, clause) in self.open.iter_mut().zip(&self.clauses) {
            *slot = clause.len() as u32;
        }
        self.values.fill(None);
        self.trail.clear();
        self.journal.clear();
    }

    /// Literals of the input's unit clauses, to seed propagation.
    fn initial_units(&self) -> Vec<Lit> {
        self.clauses
            .iter()
            .filter(|c| c.is_unit())
            .map(|c| c[0])
            .collect()
    }

    /// Applies one literal; `false` signals a conflict. Newly created unit
    /// clauses push their literal onto `units`.
    fn assign(&mut self, lit: Lit, units: &mut Vec<Lit>) -> bool {
        let var = lit.var_index();
        let polarity = lit.is_positive();
        if let Some(current) = self.values[var] {
            return current == polarity;
        }
        self.values[var] = Some(polarity);
        self.trail.push(var);

        for n in 0..self.adjacency[var].len() {
            let ci = self.adjacency[var][n];
            if self.satisfied[ci] {
                continue;
            }

            let (satisfied_here, falsified) = {
                let mut sat = false;
                let mut count = 0u32;
                for &l in self.clauses[ci].iter() {
                    if l.var_index() == var {
                        if l.is_positive() == polarity {
                            sat = true;
                            break;
                        }
                        count += 1;
                    }
                }
                (sat, count)
            };

            if satisfied_here {
                self.satisfied[ci] = true;
                self.journal.push(Change::Satisfied(ci));
            } else {
                self.open[ci] -= falsified;
                self.journal.push(Change::Shrunk(ci, falsified));
                if self.open[ci] == 0 {
                    log::trace!("conflict in clause {ci} assigning {lit}");
                    return false;
                }
                if self.open[ci] == 1 {
                    if let Some(&unit) = self.clauses[ci]
                        .iter()
                        .find(|l| self.values[l.var_index()].is_none())
                    {
                        units.push(unit);
                    }
                }
            }
        }
        true
    }

    /// Drains the unit queue to closure; `false` on conflict.
    fn propagate(&mut self, mut units: Vec<Lit>) -> bool {
        while let Some(lit) = units.pop() {
            if !self.assign(lit, &mut units) {
                return false;
            }
        }
        true
    }

    /// Rolls the journal and trail back to their marks.
    fn undo_to(&mut self, journal_mark: usize, trail_mark: usize) {
        for change in self.journal.split_off(journal_mark).into_iter().rev() {
            match change {
                Change::Satisfied(ci) => self.satisfied[ci] = false,
                Change::Shrunk(ci, n) => self.open[ci] += n,
            }
        }
        for var in self.trail.split_off(trail_mark) {
            self.values[var] = None;
        }
    }

    /// The branch literal: the first unassigned literal of the first
    /// unsatisfied clause.
    fn branch_literal(&self, ci: usize) -> Lit {
        *self.clauses[ci]
            .iter()
            .find(|l| self.values[l.var_index()].is_none())
            .expect("an open clause has an unassigned literal")
    }

    /// Finds one model. On success the trail holds the assignment; on
    /// failure the state is rolled back.
    fn search(&mut self, seed: Vec<Lit>) -> bool {
        let journal_mark = self.journal.len();
        let trail_mark = self.trail.len();

        if !self.propagate(seed) {
            self.undo_to(journal_mark, trail_mark);
            return false;
        }

        let Some(ci) = self.satisfied.iter().position(|&s| !s) else {
            return true;
        };
        let lit = self.branch_literal(ci);

        if self.search(vec![lit]) || self.search(vec![lit.negated()]) {
            return true;
        }
        self.undo_to(journal_mark, trail_mark);
        false
    }

    /// Collects every model under the current state into `out`.
    fn enumerate(&mut self, seed: Vec<Lit>, out: &mut Vec<Solutions>) {
        let journal_mark = self.journal.len();
        let trail_mark = self.trail.len();

        if self.propagate(seed) {
            if let Some(ci) = self.satisfied.iter().position(|&s| !s) {
                let lit = self.branch_literal(ci);
                self.enumerate(vec![lit], out);
                self.enumerate(vec![lit.negated()], out);
            } else {
                let mut completion =
                    Completion::new(&self.assigned_literals(), self.num_vars);
                while let Some(model) = completion.next_model() {
                    out.push(model);
                }
            }
        }
        self.undo_to(journal_mark, trail_mark);
    }

    /// The trail as literals.
    fn assigned_literals(&self) -> Vec<Lit> {
        self.trail
            .iter()
            .map(|&var| {
                #[allow(clippy::cast_possible_truncation)]
                Lit::new(var as u32 + 1, self.values[var] == Some(false))
            })
            .collect()
    }
}
