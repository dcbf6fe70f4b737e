//! Solve outcomes, statistics, and solution valuations.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::model::VarId;

/// Caller signal returned from the per-solution callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchControl {
    /// Keep searching.
    Continue,
    /// Stop the search cooperatively. Work in flight at the moment of the
    /// request still completes before the solver halts.
    Stop,
}

/// Terminal status of a solve run.
///
/// Infeasibility is a valid terminal result, not a fault: a solver that
/// proves the absence of any satisfying assignment returns
/// [`SearchStatus::Infeasible`] with zero callback invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchStatus {
    /// The search space was exhausted; every solution was enumerated.
    Exhausted,
    /// The caller-set solution limit was reached.
    LimitReached,
    /// The callback, a cancel flag, or an adapter deadline stopped the search.
    Stopped,
    /// No satisfying assignment exists.
    Infeasible,
}

/// Aggregate counters for one solve run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Solutions delivered to the callback.
    pub solutions_found: u64,
    /// Dead ends hit during search.
    pub conflicts: u64,
    /// Branch decisions taken.
    pub branches: u64,
    /// Wall-clock solve duration.
    pub wall_time: Duration,
}

/// Terminal outcome of a solve run: status plus statistics.
///
/// Returned regardless of outcome, so statistics are never silently
/// discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveResult {
    /// Why the search ended.
    pub status: SearchStatus,
    /// Run counters.
    pub stats: SearchStats,
}

impl SolveResult {
    /// Whether at least one satisfying assignment was found.
    pub fn is_feasible(&self) -> bool {
        !matches!(self.status, SearchStatus::Infeasible)
    }
}

/// A complete boolean valuation of all assignment variables.
///
/// Produced transiently per callback invocation; callbacks must treat it
/// as read-only and must not retain references past their own scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    values: Vec<bool>,
}

impl Solution {
    /// Wraps a complete valuation. Intended for solver implementations.
    pub fn new(values: Vec<bool>) -> Self {
        Self { values }
    }

    /// Value of one assignment variable.
    ///
    /// The handle must come from the model this solution was produced for.
    #[inline]
    pub fn value(&self, var: VarId) -> bool {
        self.values[var.index()]
    }

    /// Number of variables in the valuation.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the valuation is empty.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solve_result_feasibility() {
        let stats = SearchStats::default();
        let feasible = SolveResult {
            status: SearchStatus::Exhausted,
            stats,
        };
        let infeasible = SolveResult {
            status: SearchStatus::Infeasible,
            stats,
        };
        assert!(feasible.is_feasible());
        assert!(!infeasible.is_feasible());
    }

    #[test]
    fn test_stats_serde_roundtrip() {
        let stats = SearchStats {
            solutions_found: 2,
            conflicts: 5,
            branches: 17,
            wall_time: Duration::from_millis(3),
        };
        let json = serde_json::to_string(&stats).unwrap();
        let back: SearchStats = serde_json::from_str(&json).unwrap();
        assert_eq!(back, stats);
    }
}
