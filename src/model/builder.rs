//! Rule-level constraint construction.
//!
//! [`RosterBuilder`] translates declarative staffing rules into typed
//! [`Constraint`]s over the model's decision variables. Every operation
//! validates its arguments before emitting anything, so a failed call
//! leaves the model unchanged.

use chrono::NaiveDate;
use tracing::warn;

use super::model::{Constraint, RosterModel};
use super::variables::{ShiftId, WorkerId};
use crate::calendar::DayFilter;
use crate::error::{Result, RosterError};

/// Builds rostering rules into an assignment model.
///
/// Rules reference workers and shift types by name; unknown names fail
/// with [`RosterError::InvalidArgument`] at the offending call. A day
/// filter that matches no day of the period makes the rule vacuous: no
/// constraint is emitted and a warning is logged.
///
/// # Examples
///
/// ```
/// use u_roster::calendar::{generate_days, DayFilter};
/// use u_roster::model::{RosterBuilder, RosterModel};
///
/// let model = RosterModel::build(
///     generate_days(2025, 2).unwrap(),
///     vec!["ward".into(), "on-call".into()],
///     vec!["kim".into(), "lee".into(), "park".into()],
/// ).unwrap();
///
/// let mut builder = RosterBuilder::new(model);
/// builder.one_worker_per_shift(&["ward"], &DayFilter::All).unwrap();
/// builder.forbid_shifts(&["on-call"], &DayFilter::Weekend).unwrap();
/// builder.rest_window(2).unwrap();
///
/// let model = builder.finish();
/// assert!(model.constraint_count() > 0);
/// ```
#[derive(Debug)]
pub struct RosterBuilder {
    model: RosterModel,
}

impl RosterBuilder {
    /// Wraps a freshly built model.
    pub fn new(model: RosterModel) -> Self {
        Self { model }
    }

    /// The model under construction.
    pub fn model(&self) -> &RosterModel {
        &self.model
    }

    /// Returns the assembled model, freezing rule construction.
    pub fn finish(self) -> RosterModel {
        self.model
    }

    /// Requires every matching (day, shift) slot to be covered by exactly
    /// one worker.
    ///
    /// Emits one `ExactlyOne` over all workers per matching slot and marks
    /// the slot as covered for schedule extraction.
    pub fn one_worker_per_shift(&mut self, shifts: &[&str], filter: &DayFilter) -> Result<()> {
        let shifts = self.resolve_shifts(shifts)?;
        let days = self.filtered_days(filter, "one_worker_per_shift");

        for &day in &days {
            for &shift in &shifts {
                let vars = (0..self.model.workers().len())
                    .map(|w| self.model.var_at(day, shift, WorkerId(w)))
                    .collect();
                self.model.add_constraint(Constraint::ExactlyOne { vars });
                self.model.mark_covered(day, shift);
            }
        }
        Ok(())
    }

    /// Forbids any worker from taking the given shifts on matching days.
    ///
    /// Emits one `ForceAllFalse` over the whole days×shifts×workers block.
    pub fn forbid_shifts(&mut self, shifts: &[&str], filter: &DayFilter) -> Result<()> {
        let shifts = self.resolve_shifts(shifts)?;
        let days = self.filtered_days(filter, "forbid_shifts");
        if days.is_empty() {
            return Ok(());
        }

        let mut vars = Vec::with_capacity(days.len() * shifts.len() * self.model.workers().len());
        for &day in &days {
            for &shift in &shifts {
                for w in 0..self.model.workers().len() {
                    vars.push(self.model.var_at(day, shift, WorkerId(w)));
                }
            }
        }
        self.model.add_constraint(Constraint::ForceAllFalse { vars });
        Ok(())
    }

    /// Limits every worker to at most one duty within any `window_days`
    /// consecutive days, across all shift types.
    ///
    /// With `window_days == 1` this is plain same-day exclusivity; larger
    /// windows couple same-day exclusivity with multi-day rest recovery
    /// into one rule. Working shift A on day 1 and shift B on day 2 is
    /// disallowed identically to working the same shift twice.
    pub fn rest_window(&mut self, window_days: usize) -> Result<()> {
        if window_days == 0 {
            return Err(RosterError::InvalidArgument(
                "rest window of zero days".into(),
            ));
        }
        let num_days = self.model.days().len();
        if window_days > num_days {
            warn!(
                rule = "rest_window",
                window_days, num_days, "window longer than period; rule is vacuous"
            );
            return Ok(());
        }

        let num_shifts = self.model.shifts().len();
        for w in 0..self.model.workers().len() {
            for start in 0..=num_days - window_days {
                let mut vars = Vec::with_capacity(window_days * num_shifts);
                for day in start..start + window_days {
                    for s in 0..num_shifts {
                        vars.push(self.model.var_at(day, ShiftId(s), WorkerId(w)));
                    }
                }
                self.model.add_constraint(Constraint::AtMostOne { vars });
            }
        }
        Ok(())
    }

    /// Bounds a worker's duty count over the given shifts and days,
    /// inclusive on both ends.
    pub fn shift_quota(
        &mut self,
        worker: &str,
        shifts: &[&str],
        min: usize,
        max: usize,
        filter: &DayFilter,
    ) -> Result<()> {
        if min > max {
            return Err(RosterError::InvalidArgument(format!(
                "quota bounds {min} > {max}"
            )));
        }
        let worker = self.resolve_worker(worker)?;
        let shifts = self.resolve_shifts(shifts)?;
        let days = self.filtered_days(filter, "shift_quota");
        if days.is_empty() {
            return Ok(());
        }

        let mut vars = Vec::with_capacity(days.len() * shifts.len());
        for &day in &days {
            for &shift in &shifts {
                vars.push(self.model.var_at(day, shift, worker));
            }
        }
        self.model
            .add_constraint(Constraint::SumBounds { vars, min, max });
        Ok(())
    }

    /// Requires a worker to be on duty, in at least one of the given
    /// shifts, on each listed date.
    ///
    /// Emits one `Disjunction` per date.
    pub fn require_on_duty(
        &mut self,
        worker: &str,
        shifts: &[&str],
        dates: &[NaiveDate],
    ) -> Result<()> {
        let worker = self.resolve_worker(worker)?;
        let shifts = self.resolve_shifts(shifts)?;
        if dates.is_empty() {
            warn!(rule = "require_on_duty", "no dates listed; rule is vacuous");
            return Ok(());
        }

        for &date in dates {
            let day = self.resolve_date(date)?;
            let vars = shifts
                .iter()
                .map(|&shift| self.model.var_at(day, shift, worker))
                .collect();
            self.model.add_constraint(Constraint::Disjunction { vars });
        }
        Ok(())
    }

    /// Requires a worker to be fully off duty on each listed date.
    ///
    /// Emits one `ForceAllFalse` over all shift types per date.
    pub fn require_off_duty(&mut self, worker: &str, dates: &[NaiveDate]) -> Result<()> {
        let worker = self.resolve_worker(worker)?;
        if dates.is_empty() {
            warn!(rule = "require_off_duty", "no dates listed; rule is vacuous");
            return Ok(());
        }

        for &date in dates {
            let day = self.resolve_date(date)?;
            let vars = (0..self.model.shifts().len())
                .map(|s| self.model.var_at(day, ShiftId(s), worker))
                .collect();
            self.model.add_constraint(Constraint::ForceAllFalse { vars });
        }
        Ok(())
    }

    fn resolve_worker(&self, name: &str) -> Result<WorkerId> {
        self.model
            .worker_id(name)
            .ok_or_else(|| RosterError::InvalidArgument(format!("unknown worker: {name}")))
    }

    fn resolve_shifts(&self, names: &[&str]) -> Result<Vec<ShiftId>> {
        if names.is_empty() {
            return Err(RosterError::InvalidArgument("empty shift subset".into()));
        }
        let mut shifts = Vec::with_capacity(names.len());
        for &name in names {
            let shift = self
                .model
                .shift_id(name)
                .ok_or_else(|| RosterError::InvalidArgument(format!("unknown shift type: {name}")))?;
            if shifts.contains(&shift) {
                return Err(RosterError::InvalidArgument(format!(
                    "duplicate shift in subset: {name}"
                )));
            }
            shifts.push(shift);
        }
        Ok(shifts)
    }

    fn resolve_date(&self, date: NaiveDate) -> Result<usize> {
        self.model
            .day_position(date)
            .ok_or_else(|| RosterError::InvalidArgument(format!("date outside period: {date}")))
    }

    fn filtered_days(&self, filter: &DayFilter, rule: &str) -> Vec<usize> {
        let days: Vec<usize> = self
            .model
            .days()
            .iter()
            .enumerate()
            .filter(|(_, &date)| filter.matches(date))
            .map(|(i, _)| i)
            .collect();
        if days.is_empty() {
            warn!(rule, "day filter matched no days; rule is vacuous");
        }
        days
    }
}
