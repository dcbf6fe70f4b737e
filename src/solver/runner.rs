//! Solver contract and the systematic reference implementation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use super::config::SolverConfig;
use super::types::{SearchControl, SearchStats, SearchStatus, SolveResult, Solution};
use crate::error::Result;
use crate::model::{Constraint, RosterModel};

/// Interface for constraint solver implementations.
///
/// Implementors search the frozen constraint model and invoke
/// `on_solution` once per satisfying assignment found, in an
/// implementation-defined order. Solution delivery is strictly serial:
/// one callback at a time, with exclusive access to its [`Solution`].
/// The callback may request a cooperative stop by returning
/// [`SearchControl::Stop`].
///
/// This can wrap external engines (OR-Tools CP-SAT, CPLEX CP Optimizer)
/// or provide custom search. Proven infeasibility is a successful result
/// ([`SearchStatus::Infeasible`], zero callbacks), never an `Err`.
///
/// # Errors
/// [`RosterError::Model`](crate::RosterError::Model) if the assembled
/// model is structurally invalid; implementations check this before any
/// search begins.
pub trait RosterSolver {
    /// Searches the model, reporting each solution to `on_solution`.
    fn solve(
        &self,
        model: &RosterModel,
        config: &SolverConfig,
        on_solution: &mut dyn FnMut(&Solution) -> SearchControl,
    ) -> Result<SolveResult>;
}

/// A systematic depth-first enumerator over the assignment variables.
///
/// The reference implementation of [`RosterSolver`]: complete, exact, and
/// deterministic for a given configuration. Branches in variable index
/// order (false before true), or in a seed-shuffled order when
/// [`SolverConfig::seed`] is set; prunes a branch as soon as any touched
/// constraint can no longer be satisfied.
///
/// # Limitations
///
/// - No clause learning or propagation beyond per-constraint counting
/// - Exponential worst case: intended for tests and small rosters, not as
///   a replacement for an industrial CP engine
pub struct EnumerationSolver {
    cancel: Option<Arc<AtomicBool>>,
}

impl EnumerationSolver {
    /// Creates a solver without a cancel flag.
    pub fn new() -> Self {
        Self { cancel: None }
    }

    /// Creates a solver that stops cooperatively when `cancel` becomes
    /// true. The flag is checked before each branch decision.
    pub fn with_cancel(cancel: Arc<AtomicBool>) -> Self {
        Self {
            cancel: Some(cancel),
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }
}

impl Default for EnumerationSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Live counts for one constraint during search.
struct ConstraintState {
    true_count: usize,
    unassigned: usize,
}

/// Incremental search state: tri-state values plus per-constraint counts.
struct Search<'a> {
    constraints: &'a [Constraint],
    states: Vec<ConstraintState>,
    /// Variable index to the constraints ranging over it.
    watchers: Vec<Vec<usize>>,
    values: Vec<Option<bool>>,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    fn new(model: &'a RosterModel) -> Self {
        let constraints = model.constraints();
        let mut watchers = vec![Vec::new(); model.var_count()];
        let mut states = Vec::with_capacity(constraints.len());
        for (ci, constraint) in constraints.iter().enumerate() {
            for var in constraint.vars() {
                watchers[var.index()].push(ci);
            }
            states.push(ConstraintState {
                true_count: 0,
                unassigned: constraint.vars().len(),
            });
        }
        Self {
            constraints,
            states,
            watchers,
            values: vec![None; model.var_count()],
            stats: SearchStats::default(),
        }
    }

    /// Whether a constraint can still be satisfied given its counts.
    ///
    /// Sound and complete at the leaves: with zero unassigned variables
    /// each arm collapses to the constraint's exact definition.
    fn satisfiable(&self, ci: usize) -> bool {
        let state = &self.states[ci];
        let (t, u) = (state.true_count, state.unassigned);
        match &self.constraints[ci] {
            Constraint::ExactlyOne { .. } => t <= 1 && t + u >= 1,
            Constraint::AtMostOne { .. } => t <= 1,
            Constraint::SumBounds { min, max, .. } => t <= *max && t + u >= *min,
            Constraint::Disjunction { .. } => t + u >= 1,
            Constraint::ForceAllFalse { .. } => t == 0,
        }
    }

    /// Assigns a variable and reports whether every touched constraint
    /// remains satisfiable.
    fn assign(&mut self, var: usize, value: bool) -> bool {
        self.values[var] = Some(value);
        let mut consistent = true;
        for i in 0..self.watchers[var].len() {
            let ci = self.watchers[var][i];
            self.states[ci].unassigned -= 1;
            if value {
                self.states[ci].true_count += 1;
            }
            if consistent && !self.satisfiable(ci) {
                consistent = false;
            }
        }
        consistent
    }

    fn unassign(&mut self, var: usize) {
        let value = match self.values[var].take() {
            Some(value) => value,
            None => return,
        };
        for i in 0..self.watchers[var].len() {
            let ci = self.watchers[var][i];
            self.states[ci].unassigned += 1;
            if value {
                self.states[ci].true_count -= 1;
            }
        }
    }

    fn snapshot(&self) -> Solution {
        Solution::new(self.values.iter().map(|v| *v == Some(true)).collect())
    }
}

/// Backtracks: pops and flips decisions until an untried `true` branch
/// assigns consistently. Returns false when the tree is exhausted.
fn climb(search: &mut Search<'_>, order: &[usize], frames: &mut Vec<bool>) -> bool {
    loop {
        match frames.pop() {
            None => return false,
            Some(tried_true) => {
                let var = order[frames.len()];
                search.unassign(var);
                if !tried_true {
                    search.stats.branches += 1;
                    let consistent = search.assign(var, true);
                    frames.push(true);
                    if consistent {
                        return true;
                    }
                    search.stats.conflicts += 1;
                }
            }
        }
    }
}

impl RosterSolver for EnumerationSolver {
    fn solve(
        &self,
        model: &RosterModel,
        config: &SolverConfig,
        on_solution: &mut dyn FnMut(&Solution) -> SearchControl,
    ) -> Result<SolveResult> {
        config.validate()?;
        model.validate()?;

        let n = model.var_count();
        let start = Instant::now();

        let mut order: Vec<usize> = (0..n).collect();
        if let Some(seed) = config.seed {
            order.shuffle(&mut StdRng::seed_from_u64(seed));
        }

        let mut search = Search::new(model);
        // One entry per assigned decision: the value currently tried.
        let mut frames: Vec<bool> = Vec::with_capacity(n);

        let mut status = loop {
            if self.cancelled() {
                break SearchStatus::Stopped;
            }
            if let Some(limit) = config.time_limit {
                if start.elapsed() >= limit {
                    break SearchStatus::Stopped;
                }
            }

            if frames.len() == n {
                search.stats.solutions_found += 1;
                let solution = search.snapshot();
                if on_solution(&solution) == SearchControl::Stop {
                    break SearchStatus::Stopped;
                }
                if config
                    .solution_limit
                    .is_some_and(|limit| search.stats.solutions_found >= limit as u64)
                {
                    break SearchStatus::LimitReached;
                }
                if !climb(&mut search, &order, &mut frames) {
                    break SearchStatus::Exhausted;
                }
                continue;
            }

            let var = order[frames.len()];
            search.stats.branches += 1;
            let consistent = search.assign(var, false);
            frames.push(false);
            if !consistent {
                search.stats.conflicts += 1;
                if !climb(&mut search, &order, &mut frames) {
                    break SearchStatus::Exhausted;
                }
            }
        };

        if status == SearchStatus::Exhausted && search.stats.solutions_found == 0 {
            status = SearchStatus::Infeasible;
        }

        let mut stats = search.stats;
        stats.wall_time = start.elapsed();
        debug!(
            ?status,
            solutions = stats.solutions_found,
            branches = stats.branches,
            conflicts = stats.conflicts,
            "search finished"
        );
        Ok(SolveResult { status, stats })
    }
}
