//! Assignment model: decision index and typed constraints.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::debug;

use super::variables::{ShiftId, VarId, WorkerId};
use crate::error::{Result, RosterError};

/// Default ceiling on the decision cross product.
///
/// The expected order of magnitude for one scheduling run is tens of
/// thousands of variables; anything past this ceiling is almost certainly
/// a data error upstream.
pub const DEFAULT_VARIABLE_LIMIT: usize = 100_000;

/// A typed restriction over a set of assignment variables.
///
/// Constraints are immutable once added and accumulate monotonically until
/// solve time. All bounds are inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Exactly one variable in the set is true.
    ExactlyOne {
        /// Variables in the set.
        vars: Vec<VarId>,
    },

    /// At most one variable in the set is true.
    AtMostOne {
        /// Variables in the set.
        vars: Vec<VarId>,
    },

    /// The count of true variables lies in `min..=max`.
    SumBounds {
        /// Variables in the set.
        vars: Vec<VarId>,
        /// Inclusive lower bound.
        min: usize,
        /// Inclusive upper bound.
        max: usize,
    },

    /// At least one variable in the set is true.
    Disjunction {
        /// Variables in the set.
        vars: Vec<VarId>,
    },

    /// Every variable in the set is false.
    ForceAllFalse {
        /// Variables in the set.
        vars: Vec<VarId>,
    },
}

impl Constraint {
    /// The variables this constraint ranges over.
    pub fn vars(&self) -> &[VarId] {
        match self {
            Constraint::ExactlyOne { vars }
            | Constraint::AtMostOne { vars }
            | Constraint::SumBounds { vars, .. }
            | Constraint::Disjunction { vars }
            | Constraint::ForceAllFalse { vars } => vars,
        }
    }
}

/// The boolean assignment model for one scheduling run.
///
/// Allocates one decision per (day, shift, worker) triple of the fixed
/// input sets, then accumulates [`Constraint`]s over those decisions.
/// Days, shifts, and workers are frozen at build time; variables are never
/// deleted or re-keyed.
///
/// # Examples
///
/// ```
/// use u_roster::calendar::generate_days;
/// use u_roster::model::RosterModel;
///
/// let model = RosterModel::build(
///     generate_days(2025, 2).unwrap(),
///     vec!["ward".into(), "on-call".into()],
///     vec!["kim".into(), "lee".into()],
/// ).unwrap();
/// assert_eq!(model.var_count(), 28 * 2 * 2);
/// ```
#[derive(Debug, Clone)]
pub struct RosterModel {
    days: Vec<NaiveDate>,
    shifts: Vec<String>,
    workers: Vec<String>,
    day_index: HashMap<NaiveDate, usize>,
    shift_index: HashMap<String, ShiftId>,
    worker_index: HashMap<String, WorkerId>,
    constraints: Vec<Constraint>,
    /// (day index, shift) cells placed under an exactly-one coverage rule.
    covered: HashSet<(usize, ShiftId)>,
}

impl RosterModel {
    /// Builds the full decision index with the default variable ceiling.
    ///
    /// # Errors
    /// [`RosterError::InvalidArgument`] on an empty input list or a
    /// duplicate day, shift, or worker;
    /// [`RosterError::ResourceLimitExceeded`] if the cross product would
    /// not fit the ceiling.
    pub fn build(
        days: Vec<NaiveDate>,
        shifts: Vec<String>,
        workers: Vec<String>,
    ) -> Result<Self> {
        Self::build_with_limit(days, shifts, workers, DEFAULT_VARIABLE_LIMIT)
    }

    /// Builds the full decision index with an explicit variable ceiling.
    pub fn build_with_limit(
        days: Vec<NaiveDate>,
        shifts: Vec<String>,
        workers: Vec<String>,
        max_vars: usize,
    ) -> Result<Self> {
        if days.is_empty() {
            return Err(RosterError::InvalidArgument("no days in period".into()));
        }
        if shifts.is_empty() {
            return Err(RosterError::InvalidArgument("no shift types".into()));
        }
        if workers.is_empty() {
            return Err(RosterError::InvalidArgument("no workers".into()));
        }

        let required = days
            .len()
            .checked_mul(shifts.len())
            .and_then(|n| n.checked_mul(workers.len()))
            .ok_or(RosterError::ResourceLimitExceeded {
                required: usize::MAX,
                limit: max_vars,
            })?;
        if required > max_vars {
            return Err(RosterError::ResourceLimitExceeded {
                required,
                limit: max_vars,
            });
        }

        let mut day_index = HashMap::with_capacity(days.len());
        for (i, day) in days.iter().enumerate() {
            if day_index.insert(*day, i).is_some() {
                return Err(RosterError::InvalidArgument(format!("duplicate day: {day}")));
            }
        }
        let mut shift_index = HashMap::with_capacity(shifts.len());
        for (i, shift) in shifts.iter().enumerate() {
            if shift_index.insert(shift.clone(), ShiftId(i)).is_some() {
                return Err(RosterError::InvalidArgument(format!(
                    "duplicate shift type: {shift}"
                )));
            }
        }
        let mut worker_index = HashMap::with_capacity(workers.len());
        for (i, worker) in workers.iter().enumerate() {
            if worker_index.insert(worker.clone(), WorkerId(i)).is_some() {
                return Err(RosterError::InvalidArgument(format!(
                    "duplicate worker: {worker}"
                )));
            }
        }

        debug!(
            days = days.len(),
            shifts = shifts.len(),
            workers = workers.len(),
            variables = required,
            "built assignment model"
        );

        Ok(Self {
            days,
            shifts,
            workers,
            day_index,
            shift_index,
            worker_index,
            constraints: Vec::new(),
            covered: HashSet::new(),
        })
    }

    /// The ordered days of the period.
    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    /// Shift type names in declaration order.
    pub fn shifts(&self) -> &[String] {
        &self.shifts
    }

    /// Worker names in declaration order.
    pub fn workers(&self) -> &[String] {
        &self.workers
    }

    /// Total number of assignment variables.
    pub fn var_count(&self) -> usize {
        self.days.len() * self.shifts.len() * self.workers.len()
    }

    /// Number of accumulated constraints.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// The accumulated constraints.
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    /// Looks up a worker by name.
    pub fn worker_id(&self, name: &str) -> Option<WorkerId> {
        self.worker_index.get(name).copied()
    }

    /// Looks up a shift type by name.
    pub fn shift_id(&self, name: &str) -> Option<ShiftId> {
        self.shift_index.get(name).copied()
    }

    /// Name of a worker.
    pub fn worker_name(&self, worker: WorkerId) -> &str {
        &self.workers[worker.0]
    }

    /// Name of a shift type.
    pub fn shift_name(&self, shift: ShiftId) -> &str {
        &self.shifts[shift.0]
    }

    /// The variable for a (day, shift, worker) triple.
    ///
    /// # Errors
    /// [`RosterError::Model`] if the date is outside the period or an id
    /// is out of range for this model's fixed sets.
    pub fn var(&self, date: NaiveDate, shift: ShiftId, worker: WorkerId) -> Result<VarId> {
        let day = *self
            .day_index
            .get(&date)
            .ok_or_else(|| RosterError::Model(format!("date outside period: {date}")))?;
        if shift.0 >= self.shifts.len() {
            return Err(RosterError::Model(format!("unknown shift id: {}", shift.0)));
        }
        if worker.0 >= self.workers.len() {
            return Err(RosterError::Model(format!("unknown worker id: {}", worker.0)));
        }
        Ok(self.var_at(day, shift, worker))
    }

    /// The variable for a (day index, shift, worker) triple.
    ///
    /// Row-major: day, then shift, then worker.
    pub(crate) fn var_at(&self, day: usize, shift: ShiftId, worker: WorkerId) -> VarId {
        VarId((day * self.shifts.len() + shift.0) * self.workers.len() + worker.0)
    }

    /// Decodes a variable back to its (date, shift, worker) triple.
    ///
    /// # Errors
    /// [`RosterError::Model`] if the handle is out of range.
    pub fn decode(&self, var: VarId) -> Result<(NaiveDate, ShiftId, WorkerId)> {
        if var.0 >= self.var_count() {
            return Err(RosterError::Model(format!("unknown variable id: {}", var.0)));
        }
        let worker = var.0 % self.workers.len();
        let rest = var.0 / self.workers.len();
        let shift = rest % self.shifts.len();
        let day = rest / self.shifts.len();
        Ok((self.days[day], ShiftId(shift), WorkerId(worker)))
    }

    /// Position of a date within the period.
    pub(crate) fn day_position(&self, date: NaiveDate) -> Option<usize> {
        self.day_index.get(&date).copied()
    }

    /// Adds a constraint. Constraints accumulate and are never removed.
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Marks a (day, shift) cell as carrying an exactly-one coverage rule.
    pub(crate) fn mark_covered(&mut self, day: usize, shift: ShiftId) {
        self.covered.insert((day, shift));
    }

    /// Whether a (day, shift) cell carries an exactly-one coverage rule.
    pub(crate) fn cell_covered(&self, day: usize, shift: ShiftId) -> bool {
        self.covered.contains(&(day, shift))
    }

    /// Validates the assembled model for structural consistency.
    ///
    /// Checks that every referenced variable exists and appears at most
    /// once per constraint, every sum bound is ordered, and no exactly-one
    /// or disjunction set is empty. Solvers run this before search.
    ///
    /// # Errors
    /// [`RosterError::Model`] on the first defect found.
    pub fn validate(&self) -> Result<()> {
        let var_count = self.var_count();
        let mut seen = vec![usize::MAX; var_count];
        for (i, constraint) in self.constraints.iter().enumerate() {
            for var in constraint.vars() {
                if var.0 >= var_count {
                    return Err(RosterError::Model(format!(
                        "constraint {i} references unknown variable {}",
                        var.0
                    )));
                }
                if seen[var.0] == i {
                    return Err(RosterError::Model(format!(
                        "constraint {i} references variable {} twice",
                        var.0
                    )));
                }
                seen[var.0] = i;
            }
            match constraint {
                Constraint::ExactlyOne { vars } if vars.is_empty() => {
                    return Err(RosterError::Model(format!(
                        "constraint {i}: exactly-one over an empty set"
                    )));
                }
                Constraint::Disjunction { vars } if vars.is_empty() => {
                    return Err(RosterError::Model(format!(
                        "constraint {i}: disjunction over an empty set"
                    )));
                }
                Constraint::SumBounds { min, max, .. } if min > max => {
                    return Err(RosterError::Model(format!(
                        "constraint {i}: sum bounds {min} > {max}"
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::generate_days;

    fn small_model() -> RosterModel {
        RosterModel::build(
            generate_days(2025, 2).unwrap(),
            vec!["ward".into(), "on-call".into()],
            vec!["kim".into(), "lee".into(), "park".into()],
        )
        .unwrap()
    }

    #[test]
    fn test_build_allocates_cross_product() {
        let model = small_model();
        assert_eq!(model.var_count(), 28 * 2 * 3);
        assert_eq!(model.constraint_count(), 0);
    }

    #[test]
    fn test_var_roundtrip() {
        let model = small_model();
        let date = model.days()[10];
        let shift = model.shift_id("on-call").unwrap();
        let worker = model.worker_id("park").unwrap();

        let var = model.var(date, shift, worker).unwrap();
        assert_eq!(model.decode(var).unwrap(), (date, shift, worker));
    }

    #[test]
    fn test_var_index_is_dense_and_unique() {
        let model = small_model();
        let mut seen = vec![false; model.var_count()];
        for date in model.days().to_vec() {
            for s in 0..model.shifts().len() {
                for w in 0..model.workers().len() {
                    let var = model.var(date, ShiftId(s), WorkerId(w)).unwrap();
                    assert!(!seen[var.index()]);
                    seen[var.index()] = true;
                }
            }
        }
        assert!(seen.into_iter().all(|s| s));
    }

    #[test]
    fn test_unknown_references() {
        let model = small_model();
        let march = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let shift = model.shift_id("ward").unwrap();
        let worker = model.worker_id("kim").unwrap();

        assert!(matches!(
            model.var(march, shift, worker),
            Err(RosterError::Model(_))
        ));
        assert!(matches!(
            model.var(model.days()[0], ShiftId(9), worker),
            Err(RosterError::Model(_))
        ));
        assert!(matches!(
            model.var(model.days()[0], shift, WorkerId(9)),
            Err(RosterError::Model(_))
        ));
        assert!(model.worker_id("nobody").is_none());
        assert!(model.shift_id("night").is_none());
    }

    #[test]
    fn test_variable_ceiling() {
        let err = RosterModel::build_with_limit(
            generate_days(2025, 2).unwrap(),
            vec!["ward".into()],
            vec!["kim".into(), "lee".into()],
            10,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            RosterError::ResourceLimitExceeded {
                required: 56,
                limit: 10
            }
        ));
    }

    #[test]
    fn test_rejects_duplicates_and_empty_inputs() {
        let days = generate_days(2025, 2).unwrap();
        assert!(matches!(
            RosterModel::build(days.clone(), vec![], vec!["kim".into()]),
            Err(RosterError::InvalidArgument(_))
        ));
        assert!(matches!(
            RosterModel::build(days.clone(), vec!["ward".into()], vec![]),
            Err(RosterError::InvalidArgument(_))
        ));
        assert!(matches!(
            RosterModel::build(vec![], vec!["ward".into()], vec!["kim".into()]),
            Err(RosterError::InvalidArgument(_))
        ));
        assert!(matches!(
            RosterModel::build(
                days.clone(),
                vec!["ward".into(), "ward".into()],
                vec!["kim".into()]
            ),
            Err(RosterError::InvalidArgument(_))
        ));
        assert!(matches!(
            RosterModel::build(
                days,
                vec!["ward".into()],
                vec!["kim".into(), "kim".into()]
            ),
            Err(RosterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_validate_catches_defects() {
        let mut model = small_model();
        model.add_constraint(Constraint::AtMostOne {
            vars: vec![VarId(0), VarId(usize::MAX)],
        });
        assert!(matches!(model.validate(), Err(RosterError::Model(_))));

        let mut model = small_model();
        model.add_constraint(Constraint::SumBounds {
            vars: vec![VarId(0)],
            min: 2,
            max: 1,
        });
        assert!(matches!(model.validate(), Err(RosterError::Model(_))));

        let mut model = small_model();
        model.add_constraint(Constraint::ExactlyOne { vars: vec![] });
        assert!(matches!(model.validate(), Err(RosterError::Model(_))));

        let mut model = small_model();
        model.add_constraint(Constraint::Disjunction {
            vars: vec![VarId(3), VarId(3)],
        });
        assert!(matches!(model.validate(), Err(RosterError::Model(_))));

        let mut model = small_model();
        model.add_constraint(Constraint::Disjunction { vars: vec![] });
        assert!(matches!(model.validate(), Err(RosterError::Model(_))));
    }
}
