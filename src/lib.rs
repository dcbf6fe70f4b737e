//! Domain-agnostic duty rostering core.
//!
//! Turns declarative staffing rules for a calendar period into a boolean
//! constraint system, drives a pluggable constraint solver over it, and
//! turns each found assignment back into a verifiable schedule:
//!
//! - **Calendar**: month day sequences with leap-year handling, plus a
//!   closed day-filter predicate set (all / weekday / weekend / explicit
//!   dates) that keeps rules inspectable without arbitrary closures.
//! - **Model**: one boolean decision per (day, shift, worker) triple over
//!   interned identifiers, typed constraints, and structural validation.
//! - **Builder**: rule-level operations (slot coverage, forbidden shifts,
//!   sliding rest windows, workload quotas, per-date on-duty and off-duty
//!   requirements) that validate before emitting constraints.
//! - **Solver**: the [`RosterSolver`](solver::RosterSolver) contract for
//!   external CP engines, and a deterministic systematic enumerator for
//!   tests and small rosters. Infeasibility is a terminal result with
//!   statistics, not an error.
//! - **Report**: schedule tables and per-worker duty statistics extracted
//!   from each solution with invariant checking.
//!
//! # Architecture
//!
//! The model is the single meeting point: the builder only appends typed
//! constraints to it, solvers only read it, and reports only read it
//! together with one solution. No component holds state across runs; a
//! scheduling run is build, constrain, solve, report.

pub mod calendar;
pub mod error;
pub mod model;
pub mod report;
pub mod solver;

pub use error::{Result, RosterError};
