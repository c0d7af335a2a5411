//! Planning horizon filter
//!
//! Tasks starting at or after week `start_week` of `start_year + 1` fall
//! outside the yearly plan. They are dropped and reported, never fatal.
//!
//! The threshold is the decimal concatenation of the next year and the start
//! week (2025, week 27 → 202627), compared against the raw "Start week"
//! value. This comparison is coarse: plain week numbers never reach it, and
//! single-digit start weeks shorten the key (2025, week 5 → 20265). The
//! `YearWeek` mode compares real `(year, week)` pairs instead.
//!
//! The check runs on the raw start week before the range is projected, so a
//! dropped task never fails week-range validation.

use crate::config::HorizonMode;
use crate::stages::week_range::{key_year, week_number};
use serde::Serialize;
use tracing::warn;

/// Task removed by the horizon filter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedTask {
    pub row: usize,
    pub description: String,
    pub start_week: i64,
}

/// Summary of tasks scheduled beyond the planning horizon
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HorizonExceeded {
    pub threshold_key: i64,
    pub dropped: Vec<DroppedTask>,
}

impl HorizonExceeded {
    pub fn count(&self) -> usize {
        self.dropped.len()
    }
}

/// End of the planning year
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlanningHorizon {
    pub start_year: i32,
    pub start_week: u32,
    pub mode: HorizonMode,
}

impl PlanningHorizon {
    pub fn new(start_year: i32, start_week: u32, mode: HorizonMode) -> Self {
        Self {
            start_year,
            start_week,
            mode,
        }
    }

    /// Concatenated `(start_year + 1, start_week)` key
    pub fn threshold_key(&self) -> i64 {
        concat_digits(i64::from(self.start_year) + 1, i64::from(self.start_week))
    }

    /// True if a task starting at `start_week` lies beyond the horizon
    pub fn exceeded_by(&self, start_week: i64) -> bool {
        match self.mode {
            HorizonMode::Legacy => start_week >= self.threshold_key(),
            HorizonMode::YearWeek => {
                self.year_week_of(start_week) >= (i64::from(self.start_year) + 1, i64::from(self.start_week))
            }
        }
    }

    /// Warning for the tasks left out, `None` if nothing was dropped
    pub fn report(&self, dropped: Vec<DroppedTask>) -> Option<HorizonExceeded> {
        if dropped.is_empty() {
            return None;
        }

        warn!(
            "{} task(s) are planned after week {} of {} and are left out of the plan",
            dropped.len(),
            self.start_week,
            self.start_year + 1
        );

        Some(HorizonExceeded {
            threshold_key: self.threshold_key(),
            dropped,
        })
    }

    /// Plain weeks belong to the planning year that starts at `start_week`
    fn year_week_of(&self, value: i64) -> (i64, i64) {
        let week = week_number(value);
        match key_year(value) {
            Some(year) => (year, week),
            None if week >= i64::from(self.start_week) => (i64::from(self.start_year), week),
            None => (i64::from(self.start_year) + 1, week),
        }
    }
}

/// `concat_digits(2026, 27) == 202627`
fn concat_digits(head: i64, tail: i64) -> i64 {
    let mut shift = 10;
    while shift <= tail {
        shift *= 10;
    }
    head * shift + tail
}
