//! WEEK-RANGE PROJECTOR
//!
//! Expands a task's start/end week into every week key it occupies.
//!
//! Week values come in two encodings:
//!   - plain week numbers (1-53)
//!   - compound YYYYWW keys (e.g. 202627 = week 27 of 2026)
//!
//! Plain ranges are the inclusive integer sequence. Compound ranges walk week
//! by week and roll over from week 52 to week 1 of the next year, so the keys
//! stay strictly increasing either way. A range longer than two planning
//! years is rejected as a data-entry error.

use crate::task::OccupiedWeeks;

/// Number of week columns in the planning grid
pub const WEEKS_PER_YEAR: i64 = 52;

/// Longest range a single task may occupy
pub const MAX_SPAN_WEEKS: usize = 2 * WEEKS_PER_YEAR as usize;

/// Smallest value read as a YYYYWW key rather than a week number
const YEAR_WEEK_KEY_MIN: i64 = 100;

/// True for YYYYWW keys
pub fn is_year_week_key(value: i64) -> bool {
    value >= YEAR_WEEK_KEY_MIN
}

/// Week-of-year part of a week value
pub fn week_number(value: i64) -> i64 {
    if is_year_week_key(value) {
        value % 100
    } else {
        value
    }
}

/// Year part of a YYYYWW key
pub fn key_year(value: i64) -> Option<i64> {
    is_year_week_key(value).then(|| value / 100)
}

/// Every week key from `start` to `end`, inclusive
///
/// Returns `None` when `start > end`, when the two values mix plain and
/// compound encodings, or when the range covers more than `MAX_SPAN_WEEKS`.
pub fn occupied_weeks(start: i64, end: i64) -> Option<OccupiedWeeks> {
    if start > end || is_year_week_key(start) != is_year_week_key(end) {
        return None;
    }

    if !is_year_week_key(start) {
        let span = usize::try_from(end - start + 1).ok()?;
        return (span <= MAX_SPAN_WEEKS).then(|| (start..=end).collect());
    }

    let mut weeks = OccupiedWeeks::new();
    let (mut year, mut week) = (start / 100, start % 100);
    loop {
        let key = year * 100 + week;
        if key > end {
            break;
        }
        if weeks.len() == MAX_SPAN_WEEKS {
            return None;
        }
        weeks.push(key);
        if week >= WEEKS_PER_YEAR {
            year += 1;
            week = 1;
        } else {
            week += 1;
        }
    }
    Some(weeks)
}
