//! Conversion error taxonomy
//!
//! Every fatal error aborts the whole conversion before anything is written.
//! Non-fatal horizon drops are reported through `ConversionReport` instead.

use polars::prelude::PolarsError;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type ConversionResult<T> = Result<T, ConversionError>;

/// Pipeline stage an error originated in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    ObjectResolution,
    FrequencyNormalization,
    WeekProjection,
    Write,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Load => "load",
            Stage::ObjectResolution => "object resolution",
            Stage::FrequencyNormalization => "frequency normalization",
            Stage::WeekProjection => "week projection",
            Stage::Write => "write",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ConversionError {
    #[error("failed to read OMS export {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("OMS export is missing required column '{column}' (available: {available:?})")]
    MissingColumn {
        column: &'static str,
        available: Vec<String>,
    },

    #[error("column '{column}' could not be read: {source}")]
    ColumnType {
        column: &'static str,
        #[source]
        source: PolarsError,
    },

    #[error("row {row}: column '{column}' is empty")]
    MissingValue { row: usize, column: &'static str },

    #[error("row {row}: column '{column}' holds '{value}', expected a number")]
    InvalidValue {
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("row {row}: no object found in '{description}'. Is the Ultimo job named correctly?")]
    Resolution { row: usize, description: String },

    #[error("row {row}: unknown frequency unit '{unit}' for '{description}'")]
    InvalidFrequencyUnit {
        row: usize,
        unit: String,
        description: String,
    },

    #[error("row {row}: week range {start}..{end} for '{description}' is reversed, mixes encodings or spans more than two years")]
    InvalidWeekRange {
        row: usize,
        start: i64,
        end: i64,
        description: String,
    },

    #[error("failed to write workbook {}: {message}", path.display())]
    Write { path: PathBuf, message: String },

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl ConversionError {
    /// Stage that produced this error
    pub fn stage(&self) -> Stage {
        match self {
            Self::Load { .. }
            | Self::MissingColumn { .. }
            | Self::ColumnType { .. }
            | Self::MissingValue { .. }
            | Self::InvalidValue { .. }
            | Self::Polars(_) => Stage::Load,
            Self::Resolution { .. } => Stage::ObjectResolution,
            Self::InvalidFrequencyUnit { .. } => Stage::FrequencyNormalization,
            Self::InvalidWeekRange { .. } => Stage::WeekProjection,
            Self::Write { .. } => Stage::Write,
        }
    }

    /// Input row the error points at, if it is a row-level error
    pub fn row(&self) -> Option<usize> {
        match self {
            Self::MissingValue { row, .. }
            | Self::InvalidValue { row, .. }
            | Self::Resolution { row, .. }
            | Self::InvalidFrequencyUnit { row, .. }
            | Self::InvalidWeekRange { row, .. } => Some(*row),
            _ => None,
        }
    }
}
