//! OHJP Converter - coordinates the conversion pipeline
//!
//! raw task rows
//!   → object resolution (excluded rows dropped, complex group assigned)
//!   → frequency normalization
//!   → horizon filter (non-fatal warning)
//!   → week projection
//!   → group by complex, first-seen order
//!   → one heatmap per group
//!
//! Includes both sequential and parallel (Rayon) heatmap builds. Groups are
//! independent, so both produce identical workbooks.

use crate::config::{ConfigError, ConversionConfig};
use crate::data::OmsExport;
use crate::error::{ConversionError, ConversionResult};
use crate::stages::frequency::normalize_frequency;
use crate::stages::heatmap::{build_heatmap, HeatmapTable};
use crate::stages::horizon::{DroppedTask, HorizonExceeded, PlanningHorizon};
use crate::stages::object_resolver::{ObjectResolver, Resolution};
use crate::stages::week_range::occupied_weeks;
use crate::task::{AnnotatedTask, TaskRecord};
use rayon::prelude::*;
use rustc_hash::FxHashMap;
use serde::Serialize;
use tracing::{debug, info, warn};

/// Ordered set of heatmap sheets, one per complex group
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OhjpWorkbook {
    sheets: Vec<HeatmapTable>,
}

impl OhjpWorkbook {
    pub fn sheets(&self) -> &[HeatmapTable] {
        &self.sheets
    }

    pub fn get(&self, complex_group: &str) -> Option<&HeatmapTable> {
        self.sheets.iter().find(|sheet| sheet.complex_group == complex_group)
    }

    pub fn group_names(&self) -> Vec<&str> {
        self.sheets.iter().map(|sheet| sheet.complex_group.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }
}

/// Per-sheet line of the report
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetSummary {
    pub complex_group: String,
    pub rows: usize,
}

/// What happened during a conversion, for display to the caller
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub input_rows: usize,
    /// Source rows dropped as out of OHJP scope (traffic centres)
    pub excluded_rows: Vec<usize>,
    pub planned_tasks: usize,
    pub horizon: Option<HorizonExceeded>,
    pub unplaced_occurrences: usize,
    pub sheets: Vec<SheetSummary>,
}

/// Result of a successful conversion
#[derive(Debug, Clone)]
pub struct Conversion {
    pub workbook: OhjpWorkbook,
    pub report: ConversionReport,
    /// Tasks that made it into the workbook, in source order
    pub tasks: Vec<AnnotatedTask>,
}

/// Annotated tasks plus the rows left out along the way
#[derive(Debug, Clone, Default)]
pub struct Annotation {
    pub tasks: Vec<AnnotatedTask>,
    /// Source rows dropped as out of OHJP scope
    pub excluded_rows: Vec<usize>,
    pub horizon: Option<HorizonExceeded>,
}

/// Main converter
#[derive(Debug)]
pub struct OhjpConverter {
    config: ConversionConfig,
    resolver: ObjectResolver,
}

impl OhjpConverter {
    /// Converter with the standard object-rule cascade
    pub fn new(config: ConversionConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            resolver: ObjectResolver::standard(),
        })
    }

    /// Replace the object-rule cascade
    pub fn with_resolver(mut self, resolver: ObjectResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn config(&self) -> &ConversionConfig {
        &self.config
    }

    pub fn horizon(&self) -> PlanningHorizon {
        PlanningHorizon::new(self.config.start_year, self.config.start_week, self.config.horizon_mode)
    }

    /// Convert a loaded export (sequential)
    pub fn convert(&self, export: &OmsExport) -> ConversionResult<Conversion> {
        self.convert_records(&export.tasks()?)
    }

    /// Convert a loaded export, building the per-group heatmaps with Rayon
    pub fn convert_parallel(&self, export: &OmsExport) -> ConversionResult<Conversion> {
        self.convert_records_parallel(&export.tasks()?)
    }

    pub fn convert_records(&self, records: &[TaskRecord]) -> ConversionResult<Conversion> {
        let Annotation {
            tasks,
            excluded_rows,
            horizon,
        } = self.annotate(records)?;
        let sheets: Vec<HeatmapTable> = group_tasks(&tasks)
            .into_iter()
            .map(|(group, members)| build_heatmap(group, members, self.config.start_week))
            .collect();
        Ok(self.finish(records.len(), tasks, excluded_rows, horizon, sheets))
    }

    pub fn convert_records_parallel(&self, records: &[TaskRecord]) -> ConversionResult<Conversion> {
        let Annotation {
            tasks,
            excluded_rows,
            horizon,
        } = self.annotate(records)?;
        let sheets: Vec<HeatmapTable> = group_tasks(&tasks)
            .into_par_iter()
            .map(|(group, members)| build_heatmap(group, members, self.config.start_week))
            .collect();
        Ok(self.finish(records.len(), tasks, excluded_rows, horizon, sheets))
    }

    /// Annotate every record in one forward pass
    ///
    /// Tasks starting beyond the planning horizon are dropped before their
    /// week range is projected. Fails on the first retained record without a
    /// usable object, unit or week range.
    pub fn annotate(&self, records: &[TaskRecord]) -> ConversionResult<Annotation> {
        let categories: Vec<&str> = records.iter().map(|r| r.category.as_str()).collect();
        let descriptions: Vec<&str> = records.iter().map(|r| r.description.as_str()).collect();

        let resolutions = self
            .resolver
            .resolve_all(&categories, &descriptions)
            .map_err(|err| match err {
                ConversionError::Resolution { row, description } => ConversionError::Resolution {
                    row: records[row].row,
                    description,
                },
                other => other,
            })?;

        let horizon = self.horizon();
        debug!("Planning horizon threshold key: {}", horizon.threshold_key());

        let mut tasks = Vec::with_capacity(records.len());
        let mut excluded_rows = Vec::new();
        let mut dropped = Vec::new();

        for (record, resolution) in records.iter().zip(resolutions) {
            let (object, is_complex) = match resolution {
                Resolution::Resolved { object, is_complex } => (object, is_complex),
                Resolution::Excluded => {
                    excluded_rows.push(record.row);
                    continue;
                }
            };

            let complex_group = if is_complex {
                record.category.trim().to_string()
            } else {
                self.config.fixed_group_name.clone()
            };

            let frequency = normalize_frequency(&record.frequency_unit, record.frequency_count).map_err(|unknown| {
                ConversionError::InvalidFrequencyUnit {
                    row: record.row,
                    unit: unknown.0,
                    description: record.description.clone(),
                }
            })?;

            if horizon.exceeded_by(record.start_week) {
                dropped.push(DroppedTask {
                    row: record.row,
                    description: record.description.clone(),
                    start_week: record.start_week,
                });
                continue;
            }

            let weeks = occupied_weeks(record.start_week, record.end_week).ok_or_else(|| {
                ConversionError::InvalidWeekRange {
                    row: record.row,
                    start: record.start_week,
                    end: record.end_week,
                    description: record.description.clone(),
                }
            })?;

            tasks.push(AnnotatedTask {
                row: record.row,
                description: record.description.clone(),
                object,
                is_complex,
                complex_group,
                frequency,
                start_week: record.start_week,
                occupied_weeks: weeks,
                performer: record.performer.clone(),
            });
        }

        info!(
            "Annotated {} tasks ({} excluded as out of scope, {} beyond the horizon)",
            tasks.len(),
            excluded_rows.len(),
            dropped.len()
        );
        Ok(Annotation {
            tasks,
            excluded_rows,
            horizon: horizon.report(dropped),
        })
    }

    fn finish(
        &self,
        input_rows: usize,
        tasks: Vec<AnnotatedTask>,
        excluded_rows: Vec<usize>,
        horizon: Option<HorizonExceeded>,
        sheets: Vec<HeatmapTable>,
    ) -> Conversion {
        let unplaced_occurrences: usize = sheets.iter().map(|sheet| sheet.unplaced_occurrences).sum();
        if unplaced_occurrences > 0 {
            warn!(
                "{} week occurrence(s) fall outside weeks 1-52 and are not shown",
                unplaced_occurrences
            );
        }

        let summaries: Vec<SheetSummary> = sheets
            .iter()
            .map(|sheet| {
                debug!("Sheet '{}': {} rows", sheet.complex_group, sheet.rows.len());
                SheetSummary {
                    complex_group: sheet.complex_group.clone(),
                    rows: sheet.rows.len(),
                }
            })
            .collect();

        info!("Built {} heatmap sheet(s) from {} tasks", sheets.len(), tasks.len());

        Conversion {
            report: ConversionReport {
                input_rows,
                excluded_rows,
                planned_tasks: tasks.len(),
                horizon,
                unplaced_occurrences,
                sheets: summaries,
            },
            workbook: OhjpWorkbook { sheets },
            tasks,
        }
    }
}

/// Tasks per complex group, groups in first-seen order
fn group_tasks(tasks: &[AnnotatedTask]) -> Vec<(&str, Vec<&AnnotatedTask>)> {
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();
    let mut groups: Vec<(&str, Vec<&AnnotatedTask>)> = Vec::new();

    for task in tasks {
        let group = task.complex_group.as_str();
        let idx = *index.entry(group).or_insert_with(|| {
            groups.push((group, Vec::new()));
            groups.len() - 1
        });
        groups[idx].1.push(task);
    }

    groups
}
