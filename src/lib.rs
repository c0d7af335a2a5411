//! OHJP Converter
//!
//! Converts an Ultimo OMS maintenance export into an OHJP yearly maintenance
//! plan: one sheet per complex group, one row per task description, and 52
//! week columns holding occurrence counts.
//!
//! Module layout:
//! - `data`: loading the export with Polars
//! - `stages/`: frequency normalizer, object resolver, week projector,
//!   horizon filter, heatmap builder
//! - `converter`: the pipeline coordinator and its report
//! - `writer`: xlsx and CSV output
//! - `config`: TOML-backed conversion settings

pub mod config;
pub mod converter;
pub mod data;
pub mod error;
pub mod stages;
pub mod task;
pub mod utils;
pub mod writer;

// Re-export commonly used types
pub use config::{ConfigError, ConversionConfig, HorizonMode};
pub use converter::{Annotation, Conversion, ConversionReport, OhjpConverter, OhjpWorkbook};
pub use data::OmsExport;
pub use error::{ConversionError, ConversionResult, Stage};
pub use stages::*;
pub use task::{AnnotatedTask, TaskRecord};
pub use writer::{write_csv_sheets, write_workbook};
