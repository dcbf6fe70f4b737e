//! Calendar generation and day filtering.
//!
//! Produces the ordered day sequence for a scheduling period and defines
//! the closed set of day predicates used by rostering rules. Keeping the
//! predicates as a data enum (rather than arbitrary closures) keeps every
//! rule inspectable and unit-testable.

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use crate::error::{Result, RosterError};

/// Generates the ordered days of a calendar month, 1st through last day
/// inclusive.
///
/// Variable month lengths and leap years are handled by `chrono`.
///
/// # Errors
/// [`RosterError::InvalidDate`] if `month` is outside 1..=12 or the
/// year/month pair is outside the supported calendar range.
///
/// # Examples
///
/// ```
/// use u_roster::calendar::generate_days;
///
/// assert_eq!(generate_days(2025, 2).unwrap().len(), 28);
/// assert_eq!(generate_days(2024, 2).unwrap().len(), 29);
/// ```
pub fn generate_days(year: i32, month: u32) -> Result<Vec<NaiveDate>> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| RosterError::InvalidDate(format!("{year:04}-{month:02}")))?;

    let mut days = Vec::with_capacity(31);
    let mut day = first;
    while day.month() == month {
        days.push(day);
        day = match day.succ_opt() {
            Some(next) => next,
            None => break, // end of the supported calendar range
        };
    }
    Ok(days)
}

/// Whether a date falls on a weekend (Saturday or Sunday).
#[inline]
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// A reusable day predicate for rostering rules.
///
/// Rules restricted by a `DayFilter` apply only to the days it matches.
/// A filter that matches no day of the period makes the rule vacuous;
/// builders log a warning for that case rather than failing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DayFilter {
    /// Every day of the period.
    All,
    /// Monday through Friday.
    Weekday,
    /// Saturday and Sunday.
    Weekend,
    /// An explicit set of dates.
    Dates(BTreeSet<NaiveDate>),
}

impl DayFilter {
    /// Builds an explicit-date filter from any date iterator.
    pub fn from_dates<I>(dates: I) -> Self
    where
        I: IntoIterator<Item = NaiveDate>,
    {
        DayFilter::Dates(dates.into_iter().collect())
    }

    /// Whether this filter matches the given date.
    pub fn matches(&self, date: NaiveDate) -> bool {
        match self {
            DayFilter::All => true,
            DayFilter::Weekday => !is_weekend(date),
            DayFilter::Weekend => is_weekend(date),
            DayFilter::Dates(dates) => dates.contains(&date),
        }
    }
}
