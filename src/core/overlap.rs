//! Interval overlap tests shared by room and capacity checks.
//!
//! Time-of-day intervals are half-open: a slot ending at 12:00 does not touch one
//! starting at 12:00. Date ranges are inclusive on both ends.

use super::time::minutes_since_midnight;
use chrono::{NaiveDate, NaiveTime};

/// Returns true iff `[start_a, end_a)` and `[start_b, end_b)` intersect.
#[must_use]
pub fn time_ranges_overlap(
    start_a: NaiveTime,
    end_a: NaiveTime,
    start_b: NaiveTime,
    end_b: NaiveTime,
) -> bool {
    let (start_a, end_a) = (minutes_since_midnight(start_a), minutes_since_midnight(end_a));
    let (start_b, end_b) = (minutes_since_midnight(start_b), minutes_since_midnight(end_b));
    start_a < end_b && start_b < end_a
}

/// Returns true iff the inclusive ranges `[start_a, end_a]` and `[start_b, end_b]` share a day.
#[must_use]
pub fn date_ranges_overlap(
    start_a: NaiveDate,
    end_a: NaiveDate,
    start_b: NaiveDate,
    end_b: NaiveDate,
) -> bool {
    start_a <= end_b && start_b <= end_a
}
