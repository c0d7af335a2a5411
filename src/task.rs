//! Task records flowing through the conversion pipeline
//!
//! `TaskRecord` is one raw row of the OMS export. `AnnotatedTask` is the same
//! task after object resolution, frequency normalization and week projection.

use crate::stages::frequency::Frequency;
use smallvec::SmallVec;

/// Occupied week keys of one task (most tasks span only a few weeks)
pub type OccupiedWeeks = SmallVec<[i64; 8]>;

/// One row of the OMS export, as read from the loader
#[derive(Debug, Clone, PartialEq)]
pub struct TaskRecord {
    /// Zero-based row index in the source export
    pub row: usize,
    /// "Traject of Complex"
    pub category: String,
    /// "Omschrijving"
    pub description: String,
    /// "Frequentie", still in source notation (WK / MD / JR)
    pub frequency_unit: String,
    /// "Frequentie aantal"
    pub frequency_count: f64,
    /// "Start week": plain week number or YYYYWW key
    pub start_week: i64,
    /// "Gereed week"
    pub end_week: i64,
    /// "Uitvoerende"
    pub performer: String,
}

/// Task after every annotation stage
#[derive(Debug, Clone, PartialEq)]
pub struct AnnotatedTask {
    pub row: usize,
    pub description: String,
    pub object: String,
    pub is_complex: bool,
    /// Sheet this task lands on: the complex category, or the fixed-objects bucket
    pub complex_group: String,
    /// Always monthly after normalization
    pub frequency: Frequency,
    pub start_week: i64,
    pub occupied_weeks: OccupiedWeeks,
    pub performer: String,
}
