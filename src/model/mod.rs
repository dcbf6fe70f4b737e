//! Boolean assignment modeling.
//!
//! One decision variable per (day, shift, worker) triple, built over
//! interned identifiers, plus the typed constraints and the rule-level
//! builder that emits them.
//!
//! # Key Components
//!
//! - **Identifiers**: [`WorkerId`], [`ShiftId`], [`VarId`] — interned handles
//! - **Model**: [`RosterModel`] — full decision index, constraint storage,
//!   structural validation
//! - **Constraints**: [`Constraint`] — ExactlyOne, AtMostOne, SumBounds,
//!   Disjunction, ForceAllFalse
//! - **Builder**: [`RosterBuilder`] — staffing rules to typed constraints
//!
//! # Design
//!
//! This module defines the modeling layer only; search lives behind the
//! [`RosterSolver`](crate::solver::RosterSolver) contract. The model is
//! frozen from the moment it is handed to a solver: `solve` borrows it
//! immutably, so no rule can be added during an active search.

mod builder;
mod model;
mod variables;

pub use builder::RosterBuilder;
pub use model::{Constraint, RosterModel, DEFAULT_VARIABLE_LIMIT};
pub use variables::{ShiftId, VarId, WorkerId};
