//! Schedule extraction and per-worker statistics.
//!
//! Turns a solver-produced valuation back into a verifiable schedule
//! table and aggregate duty counts. Extraction is defensive: a valuation
//! that violates the coverage invariant the model was supposed to enforce
//! aborts with a consistency error rather than emitting a corrupted row.
//!
//! These functions are pure reads over one [`Solution`]; extracting the
//! same solution twice yields identical tables.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::calendar::DayFilter;
use crate::error::{Result, RosterError};
use crate::model::{RosterModel, ShiftId, WorkerId};
use crate::solver::Solution;

/// One extracted schedule: a row per day, a column per shift type in
/// declaration order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTable {
    /// Column order: shift type names as declared on the model.
    pub shifts: Vec<String>,
    /// One row per day of the period, in calendar order.
    pub rows: Vec<ScheduleRow>,
}

/// Assignments of one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleRow {
    /// The day.
    pub date: NaiveDate,
    /// Assigned worker per shift column; `None` for a slot no one covers.
    pub assigned: Vec<Option<String>>,
}

/// Duty statistics of one worker over the period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerSummary {
    /// Worker name.
    pub worker: String,
    /// Duty count per shift type, in declaration order.
    pub shift_counts: Vec<usize>,
    /// Weekday duties over the designated main shift subset.
    pub workday_count: usize,
    /// Weekend duties over the designated main shift subset.
    pub weekend_count: usize,
}

/// Extracts the schedule table from a solution.
///
/// A slot under an exactly-one coverage rule must have exactly one
/// assigned worker; any other count means the solver violated the model
/// and fails extraction. A slot without a coverage rule may be empty, but
/// still cannot hold more than one worker.
///
/// # Errors
/// [`RosterError::Consistency`] on a coverage violation or a valuation
/// whose size does not match the model.
pub fn extract_schedule(solution: &Solution, model: &RosterModel) -> Result<ScheduleTable> {
    check_valuation(solution, model)?;

    let mut rows = Vec::with_capacity(model.days().len());
    for (day, &date) in model.days().iter().enumerate() {
        let mut assigned = Vec::with_capacity(model.shifts().len());
        for s in 0..model.shifts().len() {
            let shift = ShiftId(s);
            let mut on_duty = (0..model.workers().len())
                .map(WorkerId)
                .filter(|&worker| solution.value(model.var_at(day, shift, worker)));

            match (on_duty.next(), on_duty.next()) {
                (Some(worker), None) => {
                    assigned.push(Some(model.worker_name(worker).to_string()));
                }
                (None, _) if !model.cell_covered(day, shift) => assigned.push(None),
                (None, _) => {
                    return Err(RosterError::Consistency(format!(
                        "no worker assigned to covered slot {date}/{}",
                        model.shift_name(shift)
                    )));
                }
                (Some(_), Some(_)) => {
                    return Err(RosterError::Consistency(format!(
                        "multiple workers assigned to slot {date}/{}",
                        model.shift_name(shift)
                    )));
                }
            }
        }
        rows.push(ScheduleRow { date, assigned });
    }

    Ok(ScheduleTable {
        shifts: model.shifts().to_vec(),
        rows,
    })
}

/// Counts a worker's true assignments over the given shifts and days.
///
/// Backs both raw per-shift counts and composite workday/weekend totals.
/// An empty shift list is a valid query and counts zero.
///
/// # Errors
/// [`RosterError::InvalidArgument`] on an unknown worker or shift name;
/// [`RosterError::Consistency`] on a valuation size mismatch.
pub fn count_assignments(
    solution: &Solution,
    model: &RosterModel,
    worker: &str,
    shifts: &[&str],
    filter: &DayFilter,
) -> Result<usize> {
    check_valuation(solution, model)?;
    let worker = lookup_worker(model, worker)?;
    let shifts = lookup_shifts(model, shifts)?;
    Ok(count(solution, model, worker, &shifts, filter))
}

/// Builds the per-worker statistics table: duty counts per shift type,
/// plus workday and weekend totals over the `main_shifts` subset.
///
/// # Errors
/// [`RosterError::InvalidArgument`] on an unknown shift name in
/// `main_shifts`; [`RosterError::Consistency`] on a valuation size
/// mismatch.
pub fn worker_summaries(
    solution: &Solution,
    model: &RosterModel,
    main_shifts: &[&str],
) -> Result<Vec<WorkerSummary>> {
    check_valuation(solution, model)?;
    let main_shifts = lookup_shifts(model, main_shifts)?;

    let mut summaries = Vec::with_capacity(model.workers().len());
    for w in 0..model.workers().len() {
        let worker = WorkerId(w);
        let shift_counts = (0..model.shifts().len())
            .map(|s| count(solution, model, worker, &[ShiftId(s)], &DayFilter::All))
            .collect();
        summaries.push(WorkerSummary {
            worker: model.worker_name(worker).to_string(),
            shift_counts,
            workday_count: count(solution, model, worker, &main_shifts, &DayFilter::Weekday),
            weekend_count: count(solution, model, worker, &main_shifts, &DayFilter::Weekend),
        });
    }
    Ok(summaries)
}

/// Workers with no assignment at all on the given date.
///
/// # Errors
/// [`RosterError::InvalidArgument`] if the date is outside the period;
/// [`RosterError::Consistency`] on a valuation size mismatch.
pub fn workers_off(
    solution: &Solution,
    model: &RosterModel,
    date: NaiveDate,
) -> Result<Vec<String>> {
    check_valuation(solution, model)?;
    let day = model
        .day_position(date)
        .ok_or_else(|| RosterError::InvalidArgument(format!("date outside period: {date}")))?;

    let mut off = Vec::new();
    for w in 0..model.workers().len() {
        let worker = WorkerId(w);
        let on_duty = (0..model.shifts().len())
            .any(|s| solution.value(model.var_at(day, ShiftId(s), worker)));
        if !on_duty {
            off.push(model.worker_name(worker).to_string());
        }
    }
    Ok(off)
}

fn check_valuation(solution: &Solution, model: &RosterModel) -> Result<()> {
    if solution.len() != model.var_count() {
        return Err(RosterError::Consistency(format!(
            "valuation has {} variables, model has {}",
            solution.len(),
            model.var_count()
        )));
    }
    Ok(())
}

fn lookup_worker(model: &RosterModel, name: &str) -> Result<WorkerId> {
    model
        .worker_id(name)
        .ok_or_else(|| RosterError::InvalidArgument(format!("unknown worker: {name}")))
}

fn lookup_shifts(model: &RosterModel, names: &[&str]) -> Result<Vec<ShiftId>> {
    names
        .iter()
        .map(|&name| {
            model
                .shift_id(name)
                .ok_or_else(|| RosterError::InvalidArgument(format!("unknown shift type: {name}")))
        })
        .collect()
}

fn count(
    solution: &Solution,
    model: &RosterModel,
    worker: WorkerId,
    shifts: &[ShiftId],
    filter: &DayFilter,
) -> usize {
    model
        .days()
        .iter()
        .enumerate()
        .filter(|(_, &date)| filter.matches(date))
        .map(|(day, _)| {
            shifts
                .iter()
                .filter(|&&shift| solution.value(model.var_at(day, shift, worker)))
                .count()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::generate_days;
    use crate::model::RosterBuilder;

    /// Feb 1-3 2025: Saturday, Sunday, Monday. Ward is covered, on-call
    /// is left uncovered so empty slots are legitimate.
    fn model() -> RosterModel {
        let days = generate_days(2025, 2).unwrap()[..3].to_vec();
        let model = RosterModel::build(
            days,
            vec!["ward".into(), "on-call".into()],
            vec!["kim".into(), "lee".into()],
        )
        .unwrap();
        let mut builder = RosterBuilder::new(model);
        builder
            .one_worker_per_shift(&["ward"], &DayFilter::All)
            .unwrap();
        builder.finish()
    }

    /// Ward: kim, lee, kim. On-call: empty, empty, lee.
    fn valuation(model: &RosterModel) -> Solution {
        let mut values = vec![false; model.var_count()];
        let ward = model.shift_id("ward").unwrap();
        let on_call = model.shift_id("on-call").unwrap();
        let kim = model.worker_id("kim").unwrap();
        let lee = model.worker_id("lee").unwrap();
        let days = model.days().to_vec();

        for (date, worker) in [(days[0], kim), (days[1], lee), (days[2], kim)] {
            values[model.var(date, ward, worker).unwrap().index()] = true;
        }
        values[model.var(days[2], on_call, lee).unwrap().index()] = true;
        Solution::new(values)
    }

    #[test]
    fn test_extract_schedule() {
        let model = model();
        let solution = valuation(&model);
        let table = extract_schedule(&solution, &model).unwrap();

        assert_eq!(table.shifts, vec!["ward".to_string(), "on-call".to_string()]);
        assert_eq!(table.rows.len(), 3);
        assert_eq!(
            table.rows[0].assigned,
            vec![Some("kim".to_string()), None]
        );
        assert_eq!(
            table.rows[1].assigned,
            vec![Some("lee".to_string()), None]
        );
        assert_eq!(
            table.rows[2].assigned,
            vec![Some("kim".to_string()), Some("lee".to_string())]
        );
    }

    #[test]
    fn test_extract_schedule_is_idempotent() {
        let model = model();
        let solution = valuation(&model);
        let first = extract_schedule(&solution, &model).unwrap();
        let second = extract_schedule(&solution, &model).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_uncovered_slot_violations() {
        let model = model();

        // Covered slot with no assignee.
        let empty = Solution::new(vec![false; model.var_count()]);
        assert!(matches!(
            extract_schedule(&empty, &model),
            Err(RosterError::Consistency(_))
        ));

        // Uncovered slot with two assignees.
        let mut values = vec![false; model.var_count()];
        let ward = model.shift_id("ward").unwrap();
        let on_call = model.shift_id("on-call").unwrap();
        let kim = model.worker_id("kim").unwrap();
        let lee = model.worker_id("lee").unwrap();
        for date in model.days().to_vec() {
            values[model.var(date, ward, kim).unwrap().index()] = true;
        }
        let day0 = model.days()[0];
        values[model.var(day0, on_call, kim).unwrap().index()] = true;
        values[model.var(day0, on_call, lee).unwrap().index()] = true;
        assert!(matches!(
            extract_schedule(&Solution::new(values), &model),
            Err(RosterError::Consistency(_))
        ));
    }

    #[test]
    fn test_valuation_size_mismatch() {
        let model = model();
        let wrong = Solution::new(vec![false; 3]);
        assert!(matches!(
            extract_schedule(&wrong, &model),
            Err(RosterError::Consistency(_))
        ));
        assert!(matches!(
            workers_off(&wrong, &model, model.days()[0]),
            Err(RosterError::Consistency(_))
        ));
    }

    #[test]
    fn test_count_assignments() {
        let model = model();
        let solution = valuation(&model);

        let count = |worker, shifts: &[&str], filter: &DayFilter| {
            count_assignments(&solution, &model, worker, shifts, filter).unwrap()
        };

        assert_eq!(count("kim", &["ward"], &DayFilter::All), 2);
        assert_eq!(count("kim", &["on-call"], &DayFilter::All), 0);
        assert_eq!(count("lee", &["ward", "on-call"], &DayFilter::All), 2);
        // Feb 1-2 are the weekend, Feb 3 a Monday.
        assert_eq!(count("kim", &["ward"], &DayFilter::Weekend), 1);
        assert_eq!(count("kim", &["ward"], &DayFilter::Weekday), 1);
        assert_eq!(count("lee", &["ward", "on-call"], &DayFilter::Weekday), 1);
        // Empty subset is a valid query.
        assert_eq!(count("kim", &[], &DayFilter::All), 0);

        assert!(matches!(
            count_assignments(&solution, &model, "nobody", &["ward"], &DayFilter::All),
            Err(RosterError::InvalidArgument(_))
        ));
        assert!(matches!(
            count_assignments(&solution, &model, "kim", &["night"], &DayFilter::All),
            Err(RosterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_worker_summaries() {
        let model = model();
        let solution = valuation(&model);
        let summaries = worker_summaries(&solution, &model, &["ward", "on-call"]).unwrap();

        assert_eq!(summaries.len(), 2);
        let kim = &summaries[0];
        assert_eq!(kim.worker, "kim");
        assert_eq!(kim.shift_counts, vec![2, 0]);
        assert_eq!(kim.workday_count, 1);
        assert_eq!(kim.weekend_count, 1);

        let lee = &summaries[1];
        assert_eq!(lee.worker, "lee");
        assert_eq!(lee.shift_counts, vec![1, 1]);
        assert_eq!(lee.workday_count, 1);
        assert_eq!(lee.weekend_count, 1);

        // Summaries agree with direct counting per shift.
        for summary in &summaries {
            for (s, &count) in summary.shift_counts.iter().enumerate() {
                let direct = count_assignments(
                    &solution,
                    &model,
                    &summary.worker,
                    &[model.shifts()[s].as_str()],
                    &DayFilter::All,
                )
                .unwrap();
                assert_eq!(count, direct);
            }
        }
    }

    #[test]
    fn test_workers_off() {
        let model = model();
        let solution = valuation(&model);
        let days = model.days().to_vec();

        assert_eq!(workers_off(&solution, &model, days[0]).unwrap(), vec!["lee"]);
        assert_eq!(workers_off(&solution, &model, days[1]).unwrap(), vec!["kim"]);
        assert!(workers_off(&solution, &model, days[2]).unwrap().is_empty());

        let outside = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        assert!(matches!(
            workers_off(&solution, &model, outside),
            Err(RosterError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_tables_serde_roundtrip() {
        let model = model();
        let solution = valuation(&model);

        let table = extract_schedule(&solution, &model).unwrap();
        let json = serde_json::to_string(&table).unwrap();
        let back: ScheduleTable = serde_json::from_str(&json).unwrap();
        assert_eq!(back, table);

        let summaries = worker_summaries(&solution, &model, &["ward"]).unwrap();
        let json = serde_json::to_string(&summaries).unwrap();
        let back: Vec<WorkerSummary> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summaries);
    }
}
