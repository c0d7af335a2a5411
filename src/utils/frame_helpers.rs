//! DataFrame column access with validation
//!
//! The OMS export is a spreadsheet dump: week numbers may arrive as floats,
//! counts as strings. These helpers cast each column to the type the
//! pipeline expects and turn every failure into a `ConversionError` naming
//! the column.

use crate::error::{ConversionError, ConversionResult};
use polars::prelude::*;
use std::collections::HashSet;

/// Check that every required column is present
///
/// # Errors
/// `MissingColumn` for the first absent column, listing what is available.
pub fn require_columns(df: &DataFrame, required: &[&'static str]) -> ConversionResult<()> {
    let actual: HashSet<String> = df
        .get_column_names()
        .into_iter()
        .map(|s| s.to_string())
        .collect();

    for &expected in required {
        if !actual.contains(expected) {
            let mut available: Vec<String> = actual.into_iter().collect();
            available.sort();
            return Err(ConversionError::MissingColumn {
                column: expected,
                available,
            });
        }
    }

    Ok(())
}

fn cast_column<'a>(
    df: &'a DataFrame,
    name: &'static str,
    dtype: &DataType,
) -> ConversionResult<(&'a Column, Column)> {
    let column = df.column(name).map_err(|_| ConversionError::MissingColumn {
        column: name,
        available: df.get_column_names().iter().map(|s| s.to_string()).collect(),
    })?;

    let cast = column
        .cast(dtype)
        .map_err(|source| ConversionError::ColumnType { column: name, source })?;
    Ok((column, cast))
}

/// Error for a cell that is null after casting
///
/// A cell that was already null (or blank text) is missing; anything else
/// held a value the cast could not convert.
fn null_cell_error(original: &Column, row: usize, name: &'static str) -> ConversionError {
    let value = match original.get(row) {
        Ok(AnyValue::Null) | Err(_) => None,
        Ok(AnyValue::String(text)) => Some(text.to_string()),
        Ok(AnyValue::StringOwned(text)) => Some(text.to_string()),
        Ok(other) => Some(other.to_string()),
    };

    match value {
        Some(value) if !value.trim().is_empty() => ConversionError::InvalidValue {
            row,
            column: name,
            value,
        },
        _ => ConversionError::MissingValue { row, column: name },
    }
}

/// Column as text; nulls become empty strings
pub fn text_values(df: &DataFrame, name: &'static str) -> ConversionResult<Vec<String>> {
    let (_, column) = cast_column(df, name, &DataType::String)?;
    let values = column
        .str()
        .map_err(|source| ConversionError::ColumnType { column: name, source })?;

    Ok(values
        .into_iter()
        .map(|opt| opt.unwrap_or_default().to_string())
        .collect())
}

/// Column as integers; an empty or non-numeric cell is an error
pub fn int_values(df: &DataFrame, name: &'static str) -> ConversionResult<Vec<i64>> {
    let (original, column) = cast_column(df, name, &DataType::Int64)?;
    let values = column
        .i64()
        .map_err(|source| ConversionError::ColumnType { column: name, source })?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, opt)| opt.ok_or_else(|| null_cell_error(original, row, name)))
        .collect()
}

/// Column as floats; an empty or non-numeric cell is an error
pub fn float_values(df: &DataFrame, name: &'static str) -> ConversionResult<Vec<f64>> {
    let (original, column) = cast_column(df, name, &DataType::Float64)?;
    let values = column
        .f64()
        .map_err(|source| ConversionError::ColumnType { column: name, source })?;

    values
        .into_iter()
        .enumerate()
        .map(|(row, opt)| opt.ok_or_else(|| null_cell_error(original, row, name)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_columns_success() {
        let df = df![
            "Omschrijving" => &["a", "b"],
            "Uitvoerende" => &["x", "y"],
        ]
        .unwrap();

        assert!(require_columns(&df, &["Omschrijving", "Uitvoerende"]).is_ok());
    }

    #[test]
    fn test_require_columns_missing() {
        let df = df![
            "Omschrijving" => &["a"],
        ]
        .unwrap();

        let err = require_columns(&df, &["Gereed week"]).unwrap_err();
        assert!(err.to_string().contains("Gereed week"));
        assert!(err.to_string().contains("Omschrijving"));
    }

    #[test]
    fn test_int_values_accepts_float_weeks() {
        let df = df![
            "Start week" => &[27.0, 3.0],
        ]
        .unwrap();

        assert_eq!(int_values(&df, "Start week").unwrap(), vec![27, 3]);
    }

    #[test]
    fn test_int_values_rejects_nulls() {
        let df = df![
            "Start week" => &[Some(27i64), None],
        ]
        .unwrap();

        let err = int_values(&df, "Start week").unwrap_err();
        assert_eq!(err.row(), Some(1));
    }

    #[test]
    fn test_int_values_reports_non_numeric_week() {
        let df = df![
            "Start week" => &["27", "wk27"],
        ]
        .unwrap();

        let err = int_values(&df, "Start week").unwrap_err();
        assert_eq!(err.row(), Some(1));
        assert!(matches!(
            err,
            ConversionError::InvalidValue { ref value, .. } if value == "wk27"
        ));
        assert!(!err.to_string().contains("is empty"));
    }

    #[test]
    fn test_float_values_reports_decimal_comma() {
        let df = df![
            "Frequentie aantal" => &["2,5"],
        ]
        .unwrap();

        let err = float_values(&df, "Frequentie aantal").unwrap_err();
        assert!(matches!(
            err,
            ConversionError::InvalidValue { row: 0, ref value, .. } if value == "2,5"
        ));
    }

    #[test]
    fn test_blank_text_cell_is_missing() {
        let df = df![
            "Gereed week" => &[Some("28"), Some("  "), None],
        ]
        .unwrap();

        let err = int_values(&df, "Gereed week").unwrap_err();
        assert!(matches!(err, ConversionError::MissingValue { row: 1, .. }));
    }

    #[test]
    fn test_text_values_replaces_nulls() {
        let df = df![
            "Uitvoerende" => &[Some("Aannemer"), None],
        ]
        .unwrap();

        assert_eq!(
            text_values(&df, "Uitvoerende").unwrap(),
            vec!["Aannemer".to_string(), String::new()]
        );
    }

    #[test]
    fn test_float_values_from_integers() {
        let df = df![
            "Frequentie aantal" => &[2i64, 1],
        ]
        .unwrap();

        assert_eq!(float_values(&df, "Frequentie aantal").unwrap(), vec![2.0, 1.0]);
    }
}
