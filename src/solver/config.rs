//! Search configuration.

use std::time::Duration;

use crate::error::{Result, RosterError};

/// Configuration for a solve run.
///
/// The core has no first-class timeout; `time_limit` is an adapter-layer
/// deadline that implementations honor cooperatively between search steps.
///
/// # Examples
///
/// ```
/// use u_roster::solver::SolverConfig;
///
/// let config = SolverConfig::default()
///     .with_solution_limit(5)
///     .with_seed(42);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Default)]
pub struct SolverConfig {
    /// Stop after this many solutions. `None` enumerates to exhaustion.
    pub solution_limit: Option<usize>,

    /// Seed for randomized branching order. `None` branches in index order.
    pub seed: Option<u64>,

    /// Cooperative wall-clock deadline. `None` runs unbounded.
    pub time_limit: Option<Duration>,
}

impl SolverConfig {
    /// Sets the solution limit.
    pub fn with_solution_limit(mut self, limit: usize) -> Self {
        self.solution_limit = Some(limit);
        self
    }

    /// Sets the branching-order seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the cooperative deadline.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Validates the configuration.
    ///
    /// # Errors
    /// [`RosterError::InvalidArgument`] on a zero solution limit.
    pub fn validate(&self) -> Result<()> {
        if self.solution_limit == Some(0) {
            return Err(RosterError::InvalidArgument(
                "solution limit of zero".into(),
            ));
        }
        Ok(())
    }
}
