//! Workbook output
//!
//! Writes one sheet per complex group, either as a single `.xlsx` workbook
//! (rust_xlsxwriter) or as one CSV file per group (Polars). Output is fully
//! rendered before anything touches disk, so a failed conversion never leaves
//! a partial workbook behind.

use crate::converter::OhjpWorkbook;
use crate::error::{ConversionError, ConversionResult};
use crate::stages::heatmap::{HeatmapTable, MetadataValue, EXPORT_METADATA};
use crate::utils::SheetNamer;
use polars::prelude::*;
use rust_xlsxwriter::{Format, FormatAlign, Workbook, Worksheet, XlsxError};
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Write the whole workbook to `path` (.xlsx)
pub fn write_workbook(workbook: &OhjpWorkbook, path: &Path) -> ConversionResult<()> {
    let write_err = |err: XlsxError| ConversionError::Write {
        path: path.to_path_buf(),
        message: err.to_string(),
    };

    let mut xlsx = Workbook::new();
    let header = Format::new().set_bold().set_align(FormatAlign::Center);
    let mut namer = SheetNamer::new();

    for table in workbook.sheets() {
        let name = namer.assign(&table.complex_group);
        let worksheet = xlsx.add_worksheet();
        worksheet.set_name(&name).map_err(write_err)?;
        write_sheet(worksheet, table, &header).map_err(write_err)?;
    }

    xlsx.save(path).map_err(write_err)?;
    info!("Wrote {} sheet(s) to {:?}", workbook.len(), path);
    Ok(())
}

fn write_sheet(worksheet: &mut Worksheet, table: &HeatmapTable, header: &Format) -> Result<(), XlsxError> {
    let weeks = table.week_columns();
    let first_week_col = EXPORT_METADATA.len() as u16;

    for (col, column) in EXPORT_METADATA.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, column.header(), header)?;
    }
    for (offset, week) in weeks.iter().enumerate() {
        worksheet.write_number_with_format(0, first_week_col + offset as u16, *week as f64, header)?;
    }

    for (idx, row) in table.rows.iter().enumerate() {
        let sheet_row = idx as u32 + 1;

        for (col, &column) in EXPORT_METADATA.iter().enumerate() {
            match row.metadata(column) {
                MetadataValue::Text(text) => worksheet.write_string(sheet_row, col as u16, text)?,
                MetadataValue::Number(n) => worksheet.write_number(sheet_row, col as u16, n)?,
                MetadataValue::Bool(b) => worksheet.write_boolean(sheet_row, col as u16, b)?,
            };
        }

        for (offset, &week) in weeks.iter().enumerate() {
            worksheet.write_number(sheet_row, first_week_col + offset as u16, row.count(week) as f64)?;
        }
    }

    worksheet.set_freeze_panes(1, first_week_col)?;
    Ok(())
}

/// Write one `<sheet name>.csv` per group into `dir`
///
/// Returns the written paths in workbook order.
pub fn write_csv_sheets(workbook: &OhjpWorkbook, dir: &Path) -> ConversionResult<Vec<PathBuf>> {
    let write_err = |path: &Path, message: String| ConversionError::Write {
        path: path.to_path_buf(),
        message,
    };

    let mut namer = SheetNamer::new();
    let mut rendered = Vec::with_capacity(workbook.len());
    for table in workbook.sheets() {
        let path = dir.join(format!("{}.csv", namer.assign(&table.complex_group)));
        let frame = table
            .to_export_dataframe()
            .map_err(|e| write_err(&path, e.to_string()))?;
        rendered.push((path, frame));
    }

    fs::create_dir_all(dir).map_err(|e| write_err(dir, e.to_string()))?;

    let mut written = Vec::with_capacity(rendered.len());
    for (path, mut frame) in rendered {
        let mut file = File::create(&path).map_err(|e| write_err(&path, e.to_string()))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(&mut frame)
            .map_err(|e| write_err(&path, e.to_string()))?;
        written.push(path);
    }

    info!("Wrote {} CSV sheet(s) to {:?}", written.len(), dir);
    Ok(written)
}
