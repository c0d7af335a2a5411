//! Conversion Integration Tests
//!
//! Runs the full pipeline from an OMS export frame (in memory and on disk)
//! to the written workbook.

use ohjp_converter::{
    write_csv_sheets, write_workbook, ConversionConfig, ConversionError, HorizonMode, OhjpConverter, OmsExport,
    Stage,
};
use polars::prelude::*;
use std::io::Write;

const EXPORT_CSV: &str = "\
Id,Beheerobject,Traject of Complex,Omschrijving,Start week,Gereed week,Frequentie aantal,Frequentie,Uitvoerende,Opmerking
1,BO-01,Stuw- en sluiscomplex Amerongen,ST - Stuw/Oost smeren,27,28,2,WK,Aannemer,
2,BO-02,Stuw- en sluiscomplex Amerongen,ST - Stuw/Oost smeren,28,28,2,WK,Aannemer,dubbel
3,BO-03,Verkeerscentrale Nijmegen,VC - Camera's,30,30,1,JR,Aannemer,
4,BO-04,Verkeerscentrale Nijmegen,BRG - Waalbrug/Noord,1,2,1,JR,Beheerder,
5,BO-05,Vaarweg Maas,KD - Kade Grave,40,40,3,MD,Aannemer,
6,BO-06,Traject Eilandbrug,BRG - Val inspectie,10,11,1,MD,Aannemer,
";

fn export_frame(start_weeks: &[i64], end_weeks: &[i64]) -> DataFrame {
    let n = start_weeks.len();
    df![
        "Id" => (1..=n as i64).collect::<Vec<_>>(),
        "Beheerobject" => vec!["BO"; n],
        "Traject of Complex" => vec!["Vaarweg Waal"; n],
        "Omschrijving" => (0..n).map(|i| format!("BRG - Brug {i}")).collect::<Vec<_>>(),
        "Start week" => start_weeks,
        "Gereed week" => end_weeks,
        "Frequentie aantal" => vec![1i64; n],
        "Frequentie" => vec!["MD"; n],
        "Uitvoerende" => vec!["Aannemer"; n],
    ]
    .unwrap()
}

fn write_export(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_full_conversion_from_csv() {
    let file = write_export(EXPORT_CSV);
    let export = OmsExport::load(file.path(), 0).unwrap();
    let converter = OhjpConverter::new(ConversionConfig::default()).unwrap();
    let conversion = converter.convert(&export).unwrap();

    // Verkeerscentrale camera is out of scope, the Waalbrug task is kept
    assert_eq!(conversion.report.input_rows, 6);
    assert_eq!(conversion.report.excluded_rows, vec![2]);
    assert_eq!(conversion.report.planned_tasks, 5);

    assert_eq!(
        conversion.workbook.group_names(),
        vec!["Stuw- en sluiscomplex Amerongen", "fixed objects", "Traject Eilandbrug"]
    );

    let amerongen = conversion.workbook.get("Stuw- en sluiscomplex Amerongen").unwrap();
    assert_eq!(amerongen.rows.len(), 1);
    let stuw = &amerongen.rows[0];
    assert_eq!(stuw.object, "Amerongen");
    assert!(stuw.is_complex);
    assert_eq!(stuw.count(27), 1);
    assert_eq!(stuw.count(28), 2);
    assert_eq!(stuw.frequency.count, 0.5);

    let fixed = conversion.workbook.get("fixed objects").unwrap();
    let objects: Vec<&str> = fixed.rows.iter().map(|r| r.object.as_str()).collect();
    assert_eq!(objects, vec!["Waalbrug", "Kade Grave"]);
    assert!(fixed.rows.iter().all(|r| !r.is_complex));
    assert_eq!(fixed.rows[0].frequency.count, 12.0);

    let eiland = conversion.workbook.get("Traject Eilandbrug").unwrap();
    assert_eq!(eiland.rows[0].object, "Eilandbrug");
    assert!(eiland.rows[0].is_complex);
}

#[test]
fn test_header_row_offset() {
    let contents = format!("OMS export VITAAL\n{EXPORT_CSV}");
    let file = write_export(&contents);
    let export = OmsExport::load(file.path(), 1).unwrap();
    assert_eq!(export.height(), 6);
}

#[test]
fn test_missing_column_is_load_error() {
    let file = write_export("Id,Omschrijving\n1,BRG - Waalbrug\n");
    let err = OmsExport::load(file.path(), 0).unwrap_err();
    assert_eq!(err.stage(), Stage::Load);
    assert!(matches!(err, ConversionError::MissingColumn { .. }));
}

#[test]
fn test_unreadable_file_is_load_error() {
    let err = OmsExport::load(std::path::Path::new("/nonexistent/oms.csv"), 0).unwrap_err();
    assert!(matches!(err, ConversionError::Load { .. }));
}

#[test]
fn test_non_numeric_week_names_value() {
    let contents = EXPORT_CSV.replace(",27,28,2,WK,", ",wk27,28,2,WK,");
    let file = write_export(&contents);
    let export = OmsExport::load(file.path(), 0).unwrap();
    let err = export.tasks().unwrap_err();

    assert_eq!(err.stage(), Stage::Load);
    assert_eq!(err.row(), Some(0));
    assert!(matches!(err, ConversionError::InvalidValue { .. }));
    assert!(err.to_string().contains("wk27"));
}

#[test]
fn test_malformed_description_aborts() {
    let contents = EXPORT_CSV.replace("KD - Kade Grave", "Kade Grave");
    let file = write_export(&contents);
    let export = OmsExport::load(file.path(), 0).unwrap();
    let err = OhjpConverter::new(ConversionConfig::default())
        .unwrap()
        .convert(&export)
        .unwrap_err();

    assert_eq!(err.stage(), Stage::ObjectResolution);
    assert_eq!(err.row(), Some(4));
    assert!(err.to_string().contains("Kade Grave"));
}

#[test]
fn test_week_columns_wrap_and_zero_fill() {
    let export = OmsExport::from_frame(export_frame(&[27, 1], &[27, 1])).unwrap();
    let conversion = OhjpConverter::new(ConversionConfig::default())
        .unwrap()
        .convert(&export)
        .unwrap();

    let sheet = &conversion.workbook.sheets()[0];
    let df = sheet.to_export_dataframe().unwrap();
    let names: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();

    let expected_weeks: Vec<String> = (27..=52).chain(1..=26).map(|w| w.to_string()).collect();
    assert_eq!(&names[5..], expected_weeks.as_slice());

    let week_five = df.column("5").unwrap().u32().unwrap();
    assert!(week_five.into_iter().all(|v| v == Some(0)));
}

#[test]
fn test_horizon_drops_tasks_with_warning() {
    let export = OmsExport::from_frame(export_frame(&[202601, 202701], &[202602, 202701])).unwrap();

    for mode in [HorizonMode::Legacy, HorizonMode::YearWeek] {
        let config = ConversionConfig {
            start_year: 2025,
            start_week: 27,
            horizon_mode: mode,
            ..Default::default()
        };
        let conversion = OhjpConverter::new(config).unwrap().convert(&export).unwrap();

        let horizon = conversion.report.horizon.as_ref().unwrap();
        assert_eq!(horizon.threshold_key, 202627);
        assert_eq!(horizon.count(), 1);
        assert_eq!(horizon.dropped[0].start_week, 202701);

        let sheet = conversion.workbook.get("fixed objects").unwrap();
        assert_eq!(sheet.rows.len(), 1);
        assert_eq!(sheet.rows[0].count(1), 1);
        assert_eq!(sheet.rows[0].count(2), 1);
    }
}

#[test]
fn test_custom_fixed_group_name() {
    let export = OmsExport::from_frame(export_frame(&[27], &[27])).unwrap();
    let config = ConversionConfig {
        fixed_group_name: "Vaste objecten".to_string(),
        ..Default::default()
    };
    let conversion = OhjpConverter::new(config).unwrap().convert(&export).unwrap();
    assert_eq!(conversion.workbook.group_names(), vec!["Vaste objecten"]);
}

#[test]
fn test_annotated_frame_keeps_extra_columns() {
    let file = write_export(EXPORT_CSV);
    let export = OmsExport::load(file.path(), 0).unwrap();
    let conversion = OhjpConverter::new(ConversionConfig::default())
        .unwrap()
        .convert(&export)
        .unwrap();

    let frame = export.annotated_frame(&conversion.tasks).unwrap();
    assert_eq!(frame.height(), 5);
    assert!(frame.column("Id").is_err());
    assert!(frame.column("Opmerking").is_ok());

    let units = frame.column("Frequentie").unwrap().str().unwrap();
    assert!(units.into_iter().all(|u| u == Some("MD")));

    let weeks = frame.column("Weeks").unwrap().str().unwrap();
    assert_eq!(weeks.get(0), Some("27,28"));

    let groups = frame.column("Complex").unwrap().str().unwrap();
    assert_eq!(groups.get(2), Some("fixed objects"));
}

#[test]
fn test_write_xlsx_workbook() {
    let file = write_export(EXPORT_CSV);
    let export = OmsExport::load(file.path(), 0).unwrap();
    let conversion = OhjpConverter::new(ConversionConfig::default())
        .unwrap()
        .convert(&export)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = ConversionConfig::default().workbook_path(dir.path());
    write_workbook(&conversion.workbook, &path).unwrap();

    let metadata = std::fs::metadata(&path).unwrap();
    assert!(metadata.len() > 0);
}

#[test]
fn test_write_csv_sheets_round_trip() {
    let file = write_export(EXPORT_CSV);
    let export = OmsExport::load(file.path(), 0).unwrap();
    let conversion = OhjpConverter::new(ConversionConfig::default())
        .unwrap()
        .convert(&export)
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let paths = write_csv_sheets(&conversion.workbook, dir.path()).unwrap();
    assert_eq!(paths.len(), 3);
    assert!(paths[0].ends_with("Stuw- en sluiscomplex Amerongen.csv"));

    let sheet = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(paths[1].clone()))
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(sheet.height(), 2);
    assert_eq!(sheet.width(), 5 + 52);
}
