//! HEATMAP BUILDER
//!
//! Pivots the annotated tasks of one complex group into one row per unique
//! description and one column per week number (1-52). Cells hold raw
//! occurrence counts, not presence flags.
//!
//! **Column layout**:
//!   1. metadata columns in a fixed order (first-seen values per description)
//!   2. all 52 week columns, starting at `start_week` and wrapping around
//!      (start_week = 27 → 27, 28, ..., 52, 1, ..., 26)
//!
//! Weeks without any task are still present and zero-filled.

use crate::data::columns;
use crate::stages::frequency::Frequency;
use crate::stages::week_range::{week_number, WEEKS_PER_YEAR};
use crate::task::AnnotatedTask;
use polars::prelude::*;
use rustc_hash::FxHashMap;

const WEEK_COUNT: usize = WEEKS_PER_YEAR as usize;

/// Metadata attached to each heatmap row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetadataColumn {
    Object,
    Description,
    FrequencyCount,
    FrequencyUnit,
    ComplexGroup,
    Performer,
    IsComplex,
}

impl MetadataColumn {
    pub fn header(&self) -> &'static str {
        match self {
            MetadataColumn::Object => columns::OBJECT,
            MetadataColumn::Description => columns::DESCRIPTION,
            MetadataColumn::FrequencyCount => columns::FREQUENCY_COUNT,
            MetadataColumn::FrequencyUnit => columns::FREQUENCY_UNIT,
            MetadataColumn::ComplexGroup => columns::COMPLEX_GROUP,
            MetadataColumn::Performer => columns::PERFORMER,
            MetadataColumn::IsComplex => columns::IS_COMPLEX,
        }
    }
}

/// Every metadata column, in table order
pub const FULL_METADATA: [MetadataColumn; 7] = [
    MetadataColumn::Object,
    MetadataColumn::Description,
    MetadataColumn::FrequencyCount,
    MetadataColumn::FrequencyUnit,
    MetadataColumn::ComplexGroup,
    MetadataColumn::Performer,
    MetadataColumn::IsComplex,
];

/// Metadata columns written to an OHJP sheet
pub const EXPORT_METADATA: [MetadataColumn; 5] = [
    MetadataColumn::Object,
    MetadataColumn::Description,
    MetadataColumn::FrequencyCount,
    MetadataColumn::Performer,
    MetadataColumn::IsComplex,
];

/// Typed metadata cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MetadataValue<'a> {
    Text(&'a str),
    Number(f64),
    Bool(bool),
}

/// One unique description with its weekly occurrence counts
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapRow {
    pub description: String,
    pub object: String,
    pub complex_group: String,
    pub performer: String,
    pub is_complex: bool,
    pub frequency: Frequency,
    /// Index 0 = week 1
    counts: [u32; WEEK_COUNT],
}

impl HeatmapRow {
    fn from_task(task: &AnnotatedTask) -> Self {
        Self {
            description: task.description.clone(),
            object: task.object.clone(),
            complex_group: task.complex_group.clone(),
            performer: task.performer.clone(),
            is_complex: task.is_complex,
            frequency: task.frequency,
            counts: [0; WEEK_COUNT],
        }
    }

    /// Occurrences in `week` (1-52); 0 outside that range
    pub fn count(&self, week: u32) -> u32 {
        match week {
            1..=52 => self.counts[week as usize - 1],
            _ => 0,
        }
    }

    /// Sum over all weeks
    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    pub fn metadata(&self, column: MetadataColumn) -> MetadataValue<'_> {
        match column {
            MetadataColumn::Object => MetadataValue::Text(&self.object),
            MetadataColumn::Description => MetadataValue::Text(&self.description),
            MetadataColumn::FrequencyCount => MetadataValue::Number(self.frequency.count),
            MetadataColumn::FrequencyUnit => MetadataValue::Text(self.frequency.unit.code()),
            MetadataColumn::ComplexGroup => MetadataValue::Text(&self.complex_group),
            MetadataColumn::Performer => MetadataValue::Text(&self.performer),
            MetadataColumn::IsComplex => MetadataValue::Bool(self.is_complex),
        }
    }
}

/// Heatmap of one complex group, i.e. one OHJP sheet
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapTable {
    pub complex_group: String,
    pub start_week: u32,
    /// Sorted by description
    pub rows: Vec<HeatmapRow>,
    /// Occupied week keys whose week number is outside 1-52
    pub unplaced_occurrences: usize,
}

impl HeatmapTable {
    /// Week columns in display order
    pub fn week_columns(&self) -> Vec<u32> {
        week_order(self.start_week)
    }

    pub fn row(&self, description: &str) -> Option<&HeatmapRow> {
        self.rows.iter().find(|row| row.description == description)
    }

    /// Frame with every metadata column
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        self.frame_with(&FULL_METADATA)
    }

    /// Frame with the OHJP sheet columns only
    pub fn to_export_dataframe(&self) -> PolarsResult<DataFrame> {
        self.frame_with(&EXPORT_METADATA)
    }

    fn frame_with(&self, metadata: &[MetadataColumn]) -> PolarsResult<DataFrame> {
        let mut frame_columns: Vec<Column> = Vec::with_capacity(metadata.len() + WEEK_COUNT);

        for &column in metadata {
            let name: PlSmallStr = column.header().into();
            let values = self.rows.iter().map(|row| row.metadata(column));
            let series_column = match column {
                MetadataColumn::FrequencyCount => Column::new(
                    name,
                    values
                        .map(|v| match v {
                            MetadataValue::Number(n) => n,
                            _ => f64::NAN,
                        })
                        .collect::<Vec<f64>>(),
                ),
                MetadataColumn::IsComplex => Column::new(
                    name,
                    values
                        .map(|v| matches!(v, MetadataValue::Bool(true)))
                        .collect::<Vec<bool>>(),
                ),
                _ => Column::new(
                    name,
                    values
                        .map(|v| match v {
                            MetadataValue::Text(s) => s,
                            _ => "",
                        })
                        .collect::<Vec<&str>>(),
                ),
            };
            frame_columns.push(series_column);
        }

        for week in self.week_columns() {
            let counts: Vec<u32> = self.rows.iter().map(|row| row.count(week)).collect();
            frame_columns.push(Column::new(PlSmallStr::from(week.to_string()), counts));
        }

        DataFrame::new(frame_columns)
    }
}

/// Week numbers 1-52 rotated to begin at `start_week`
///
/// Out-of-range start weeks fall back to week 1.
pub fn week_order(start_week: u32) -> Vec<u32> {
    let start = if (1..=52).contains(&start_week) { start_week } else { 1 };
    (start..=52).chain(1..start).collect()
}

/// Build the heatmap for the tasks of one complex group
pub fn build_heatmap<'a, I>(complex_group: &str, tasks: I, start_week: u32) -> HeatmapTable
where
    I: IntoIterator<Item = &'a AnnotatedTask>,
{
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut rows: Vec<HeatmapRow> = Vec::new();
    let mut unplaced_occurrences = 0;

    for task in tasks {
        let idx = *index.entry(task.description.as_str()).or_insert_with(|| {
            rows.push(HeatmapRow::from_task(task));
            rows.len() - 1
        });

        let row = &mut rows[idx];
        for &key in &task.occupied_weeks {
            match week_number(key) {
                week @ 1..=WEEKS_PER_YEAR => row.counts[week as usize - 1] += 1,
                _ => unplaced_occurrences += 1,
            }
        }
    }

    rows.sort_by(|a, b| a.description.cmp(&b.description));

    HeatmapTable {
        complex_group: complex_group.to_string(),
        start_week,
        rows,
        unplaced_occurrences,
    }
}
