//! OMS Export Loading
//!
//! Reads the Ultimo maintenance export with Polars (CSV or Parquet) and turns
//! it into `TaskRecord`s. The spreadsheet tool exports a title block above the
//! real header, so CSV input takes a header-row index.

use crate::error::{ConversionError, ConversionResult};
use crate::task::{AnnotatedTask, TaskRecord};
use crate::utils::{float_values, int_values, require_columns, text_values};
use polars::prelude::*;
use std::path::Path;
use tracing::{debug, info};

/// Column names of the OMS export and of the annotated/heatmap frames
pub mod columns {
    pub const ID: &str = "Id";
    pub const MANAGED_OBJECT: &str = "Beheerobject";
    pub const CATEGORY: &str = "Traject of Complex";
    pub const DESCRIPTION: &str = "Omschrijving";
    pub const START_WEEK: &str = "Start week";
    pub const END_WEEK: &str = "Gereed week";
    pub const FREQUENCY_COUNT: &str = "Frequentie aantal";
    pub const FREQUENCY_UNIT: &str = "Frequentie";
    pub const PERFORMER: &str = "Uitvoerende";

    // Added by the pipeline
    pub const OBJECT: &str = "Object";
    pub const IS_COMPLEX: &str = "is_complex";
    pub const COMPLEX_GROUP: &str = "Complex";
    pub const WEEKS: &str = "Weeks";

    /// Columns every export must provide
    pub const REQUIRED: [&str; 9] = [
        ID,
        MANAGED_OBJECT,
        CATEGORY,
        DESCRIPTION,
        START_WEEK,
        END_WEEK,
        FREQUENCY_COUNT,
        FREQUENCY_UNIT,
        PERFORMER,
    ];
}

/// Loaded OMS export
#[derive(Debug, Clone)]
pub struct OmsExport {
    frame: DataFrame,
}

impl OmsExport {
    /// Load from disk; `.parquet` files are scanned, anything else is read as CSV
    ///
    /// `header_row` is the zero-based line holding the column names (CSV only).
    pub fn load(path: &Path, header_row: usize) -> ConversionResult<Self> {
        let is_parquet = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("parquet"));

        let frame = if is_parquet {
            Self::load_parquet(path)
        } else {
            Self::load_csv(path, header_row)
        }
        .map_err(|source| ConversionError::Load {
            path: path.to_path_buf(),
            source,
        })?;

        info!("Loaded OMS export {:?}: {} rows × {} columns", path, frame.height(), frame.width());
        Self::from_frame(frame)
    }

    /// Wrap an in-memory frame, validating the required columns
    pub fn from_frame(frame: DataFrame) -> ConversionResult<Self> {
        require_columns(&frame, &columns::REQUIRED)?;
        Ok(Self { frame })
    }

    fn load_csv(path: &Path, header_row: usize) -> PolarsResult<DataFrame> {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_skip_rows(header_row)
            .with_infer_schema_length(None)
            .try_into_reader_with_file_path(Some(path.to_path_buf()))?
            .finish()
    }

    fn load_parquet(path: &Path) -> PolarsResult<DataFrame> {
        LazyFrame::scan_parquet(path, Default::default())?.collect()
    }

    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    /// Typed task records; `Id` and `Beheerobject` are not carried over
    pub fn tasks(&self) -> ConversionResult<Vec<TaskRecord>> {
        let df = &self.frame;

        let categories = text_values(df, columns::CATEGORY)?;
        let descriptions = text_values(df, columns::DESCRIPTION)?;
        let units = text_values(df, columns::FREQUENCY_UNIT)?;
        let counts = float_values(df, columns::FREQUENCY_COUNT)?;
        let starts = int_values(df, columns::START_WEEK)?;
        let ends = int_values(df, columns::END_WEEK)?;
        let performers = text_values(df, columns::PERFORMER)?;

        let records: Vec<TaskRecord> = categories
            .into_iter()
            .zip(descriptions)
            .zip(units)
            .zip(counts)
            .zip(starts.into_iter().zip(ends))
            .zip(performers)
            .enumerate()
            .map(
                |(row, (((((category, description), frequency_unit), frequency_count), (start_week, end_week)), performer))| {
                    TaskRecord {
                        row,
                        category,
                        description,
                        frequency_unit,
                        frequency_count,
                        start_week,
                        end_week,
                        performer,
                    }
                },
            )
            .collect();

        debug!("Extracted {} task records", records.len());
        Ok(records)
    }

    /// Source rows of `tasks` with the pipeline annotations applied
    ///
    /// Extra export columns pass through. `Traject of Complex` is renamed to
    /// `Complex` and holds the sheet group, frequencies are monthly, and
    /// `Weeks` lists the occupied week keys as comma-separated text.
    pub fn annotated_frame(&self, tasks: &[AnnotatedTask]) -> ConversionResult<DataFrame> {
        let indices: Vec<IdxSize> = tasks.iter().map(|task| task.row as IdxSize).collect();
        let indices = IdxCa::from_vec("row".into(), indices);

        let mut frame = self
            .frame
            .drop(columns::ID)?
            .drop(columns::MANAGED_OBJECT)?
            .take(&indices)?;
        frame.rename(columns::CATEGORY, columns::COMPLEX_GROUP.into())?;

        let objects: Vec<&str> = tasks.iter().map(|t| t.object.as_str()).collect();
        let is_complex: Vec<bool> = tasks.iter().map(|t| t.is_complex).collect();
        let groups: Vec<&str> = tasks.iter().map(|t| t.complex_group.as_str()).collect();
        let counts: Vec<f64> = tasks.iter().map(|t| t.frequency.count).collect();
        let units: Vec<&str> = tasks.iter().map(|t| t.frequency.unit.code()).collect();
        let weeks: Vec<String> = tasks
            .iter()
            .map(|t| {
                t.occupied_weeks
                    .iter()
                    .map(|w| w.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            })
            .collect();

        frame.with_column(Column::new(columns::COMPLEX_GROUP.into(), groups))?;
        frame.with_column(Column::new(columns::FREQUENCY_COUNT.into(), counts))?;
        frame.with_column(Column::new(columns::FREQUENCY_UNIT.into(), units))?;
        frame.with_column(Column::new(columns::OBJECT.into(), objects))?;
        frame.with_column(Column::new(columns::IS_COMPLEX.into(), is_complex))?;
        frame.with_column(Column::new(columns::WEEKS.into(), weeks))?;

        Ok(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export_frame() -> DataFrame {
        df![
            "Id" => &[1i64, 2],
            "Beheerobject" => &["BO-1", "BO-2"],
            "Traject of Complex" => &[Some("Vaarweg Waal"), None],
            "Omschrijving" => &["BRG - Waalbrug", "KD - Kade"],
            "Start week" => &[27.0, 30.0],
            "Gereed week" => &[28i64, 30],
            "Frequentie aantal" => &[2i64, 1],
            "Frequentie" => &["WK", "JR"],
            "Uitvoerende" => &["Aannemer", "Beheerder"],
        ]
        .unwrap()
    }

    #[test]
    fn test_from_frame_requires_columns() {
        let df = df!["Omschrijving" => &["a"]].unwrap();
        let err = OmsExport::from_frame(df).unwrap_err();
        assert!(matches!(err, ConversionError::MissingColumn { column: "Id", .. }));
    }

    #[test]
    fn test_tasks_are_typed() {
        let export = OmsExport::from_frame(export_frame()).unwrap();
        let tasks = export.tasks().unwrap();

        assert_eq!(tasks.len(), 2);
        assert_eq!(tasks[0].row, 0);
        assert_eq!(tasks[0].category, "Vaarweg Waal");
        assert_eq!(tasks[0].start_week, 27);
        assert_eq!(tasks[0].end_week, 28);
        assert_eq!(tasks[0].frequency_count, 2.0);
        assert_eq!(tasks[0].frequency_unit, "WK");
        assert_eq!(tasks[1].category, "");
        assert_eq!(tasks[1].performer, "Beheerder");
    }

    #[test]
    #[ignore] // Requires an OMS export on disk
    fn test_load_export() {
        let export = OmsExport::load(Path::new("data/oms_export.csv"), 0).expect("Failed to load export");
        assert!(export.height() > 0);
    }
}
