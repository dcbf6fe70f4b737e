//! Constraint solving behind a pluggable contract.
//!
//! # Key Components
//!
//! - **Contract**: [`RosterSolver`] — interface for solving engines
//! - **Configuration**: [`SolverConfig`] — solution limit, branching seed,
//!   adapter-layer deadline
//! - **Outcomes**: [`SolveResult`], [`SearchStatus`], [`SearchStats`],
//!   [`Solution`], [`SearchControl`]
//! - **Reference implementation**: [`EnumerationSolver`] — deterministic
//!   systematic enumeration for tests and small rosters
//!
//! # Design
//!
//! The model is read-only from the moment `solve` is invoked; an
//! implementation may parallelize its search internally, but solution
//! delivery to the caller is strictly serial and cancellation is
//! cooperative only. Proven infeasibility is a terminal result with
//! statistics, never an error.

mod config;
mod runner;
mod types;

pub use config::SolverConfig;
pub use runner::{EnumerationSolver, RosterSolver};
pub use types::{SearchControl, SearchStats, SearchStatus, SolveResult, Solution};
