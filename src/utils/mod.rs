//! Utility modules for the conversion pipeline
//!
//! - Frame helpers: typed, validated column access on the OMS export
//! - Sheet names: Excel-safe, unique worksheet names

pub mod frame_helpers;
pub mod sheet_names;

pub use frame_helpers::{float_values, int_values, require_columns, text_values};
pub use sheet_names::{sanitize_sheet_name, SheetNamer};
