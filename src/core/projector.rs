//! Projection of weekly recurring slots onto concrete calendar dates.
//!
//! A formation's start date anchors its schedule: the session date of a weekday
//! is the first date on or after the start that falls on that weekday. Capacity
//! accounting buckets reservations by these dates.

use super::{time::parse_date, weekday::Weekday};
use crate::errors::Result;
use chrono::{Datelike, Days, NaiveDate};

/// How recurring slots map to the dates capacity is checked on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProjectionStrategy {
    /// Only the first occurrence after the formation start counts
    #[default]
    FirstOccurrence,
    /// Every weekly occurrence inside the formation's date range counts
    EveryOccurrence,
}

/// First date on or after `anchor` that falls on `weekday`.
#[must_use]
pub fn project_date(anchor: NaiveDate, weekday: Weekday) -> NaiveDate {
    let anchor_index = anchor.weekday().num_days_from_sunday();
    let delta = (weekday.index() + 7 - anchor_index) % 7;
    // delta < 7, so this can only overflow at the very end of chrono's range
    anchor
        .checked_add_days(Days::new(u64::from(delta)))
        .unwrap_or(anchor)
}

/// Parses `anchor` and `weekday` strings, then projects.
pub fn project_date_str(anchor: &str, weekday: &str) -> Result<NaiveDate> {
    let anchor = parse_date(anchor)?;
    let weekday: Weekday = weekday.parse()?;
    Ok(project_date(anchor, weekday))
}

/// Every date in `[start, end]` falling on `weekday`.
#[must_use]
pub fn occurrences(start: NaiveDate, end: NaiveDate, weekday: Weekday) -> Vec<NaiveDate> {
    let first = project_date(start, weekday);
    first
        .iter_weeks()
        .take_while(|date| *date <= end)
        .collect()
}

impl ProjectionStrategy {
    /// Dates a slot on `weekday` occupies within the formation range `[start, end]`.
    ///
    /// Always yields at least one date: when no occurrence falls inside a
    /// formation shorter than a week, the first projected date stands in.
    #[must_use]
    pub fn session_dates(self, start: NaiveDate, end: NaiveDate, weekday: Weekday) -> Vec<NaiveDate> {
        match self {
            Self::FirstOccurrence => vec![project_date(start, weekday)],
            Self::EveryOccurrence => {
                let dates = occurrences(start, end, weekday);
                if dates.is_empty() {
                    vec![project_date(start, weekday)]
                } else {
                    dates
                }
            }
        }
    }
}
