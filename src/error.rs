//! Error types for u-roster.

use thiserror::Error;

/// Main error type for rostering operations.
///
/// Proven absence of a satisfying assignment is NOT an error: solvers
/// report it as [`SearchStatus::Infeasible`](crate::solver::SearchStatus)
/// in a successful solve result.
#[derive(Debug, Error)]
pub enum RosterError {
    /// A year/month input does not denote a real calendar month.
    #[error("invalid date: {0}")]
    InvalidDate(String),

    /// A rule argument is malformed: empty subset, inverted bounds, or a
    /// reference to a worker, shift, or date outside the fixed sets.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Structural defect in the assembled constraint model.
    #[error("model error: {0}")]
    Model(String),

    /// The decision cross product would exceed the configured ceiling.
    #[error("variable limit exceeded: {required} variables over ceiling {limit}")]
    ResourceLimitExceeded {
        /// Variables the model would need.
        required: usize,
        /// Configured ceiling.
        limit: usize,
    },

    /// A returned solution violates an invariant the model was supposed
    /// to enforce. Signals a solver defect, not caller misuse.
    #[error("inconsistent solution: {0}")]
    Consistency(String),
}

/// Result type alias for rostering operations.
pub type Result<T> = std::result::Result<T, RosterError>;
