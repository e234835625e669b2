//! End-to-end tests for the normalization pipeline.

use std::io::Write;

use indexmap::indexmap;
use pretty_assertions::assert_eq;
use rust_xlsxwriter::{Format, Workbook};
use tempfile::{NamedTempFile, TempDir};

use windline::input::{ParserConfig, read_table};
use windline::output::{self, EGRESS_DELIMITER};
use windline::transform::format_message;
use windline::{
    ColumnMap, Pipeline, PipelineConfig, Table, Value, WindlineError, normalize, project_messages,
    repair_delimiter,
};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn raw_row(ts: &str, value: Value) -> Table {
    Table::from_records(vec![indexmap! {
        "Datum / Uhrzeit" => Value::text(ts),
        "Wind Speed (avg)" => value,
    }])
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_present_value_normalizes() {
    let out = normalize(
        &raw_row("2025-11-23T23:10:00Z", Value::Float(8.72)),
        &ColumnMap::default(),
    )
    .unwrap();

    assert_eq!(out.columns(), &["timestamp", "value", "status"]);
    assert_eq!(out.get(0, "timestamp"), Some(&Value::text("2025-11-23T23:10:00Z")));
    assert_eq!(out.get(0, "value"), Some(&Value::Float(8.72)));
    assert_eq!(out.get(0, "status"), Some(&Value::Integer(0)));
}

#[test]
fn test_null_value_is_missing() {
    let out = normalize(
        &raw_row("2025-11-23T23:10:00Z", Value::Null),
        &ColumnMap::default(),
    )
    .unwrap();
    assert_eq!(out.get(0, "value"), Some(&Value::Null));
    assert_eq!(out.get(0, "status"), Some(&Value::Integer(-1)));
}

#[test]
fn test_fused_table_is_repaired() {
    let fused = Table::with_rows(
        vec!["timestamp;value;status".into()],
        vec![vec![Value::text("2025-11-23T23:10:00Z;8.72;0")]],
    )
    .unwrap();

    let out = repair_delimiter(&fused, ';').unwrap();
    assert_eq!(out.columns(), &["timestamp", "value", "status"]);
    assert_eq!(out.get(0, "timestamp"), Some(&Value::text("2025-11-23T23:10:00Z")));
    assert_eq!(out.get(0, "value"), Some(&Value::text("8.72")));
    assert_eq!(out.get(0, "status"), Some(&Value::text("0")));
}

#[test]
fn test_message_rendering() {
    let table = Table::from_records(vec![indexmap! {
        "timestamp" => Value::text("2025-11-23T23:10:00Z"),
        "value" => Value::Float(8.72),
        "status" => Value::Integer(0),
    }]);

    let out = project_messages(&table, "local-onedrive").unwrap();
    assert_eq!(out.get(0, "source"), Some(&Value::text("local-onedrive")));
    assert_eq!(
        out.get(0, "message"),
        Some(&Value::text("Timestamp: 2025-11-23T23:10:00Z | Value: 8.72 | Status: 0"))
    );
}

#[test]
fn test_missing_value_column_is_named() {
    let table = Table::from_records(vec![indexmap! {
        "Datum / Uhrzeit" => Value::text("2025-11-23T23:10:00Z"),
    }]);
    let err = normalize(&table, &ColumnMap::default()).unwrap_err();
    assert!(
        matches!(&err, WindlineError::MissingColumn { column } if column == "Wind Speed (avg)"),
        "unexpected error: {err}"
    );
}

#[test]
fn test_short_split_row_is_rejected() {
    let fused = Table::with_rows(
        vec!["timestamp;value;status".into()],
        vec![
            vec![Value::text("2025-11-23T23:10:00Z;8.72;0")],
            vec![Value::text("2025-11-23T23:20:00Z;4.1")],
        ],
    )
    .unwrap();

    match repair_delimiter(&fused, ';').unwrap_err() {
        WindlineError::RowShapeMismatch { row, found, expected } => {
            assert_eq!(row, 1);
            assert_eq!((found, expected), (2, 3));
        }
        other => panic!("unexpected error: {other}"),
    }
}

// =============================================================================
// Pipeline
// =============================================================================

#[test]
fn test_repair_then_normalize_matches_direct() {
    let direct = Table::from_records(vec![
        indexmap! {
            "Datum / Uhrzeit" => Value::text("2025-11-23T23:10:00Z"),
            "Wind Speed (avg)" => Value::Float(8.72),
        },
        indexmap! {
            "Datum / Uhrzeit" => Value::text("2025-11-23T23:20:00Z"),
            "Wind Speed (avg)" => Value::Null,
        },
    ]);
    let fused = Table::with_rows(
        vec!["Datum / Uhrzeit;Wind Speed (avg)".into()],
        vec![
            vec![Value::text("2025-11-23T23:10:00Z;8.72")],
            vec![Value::text("2025-11-23T23:20:00Z;")],
        ],
    )
    .unwrap();

    let pipeline = Pipeline::new();
    assert_eq!(pipeline.run(&fused).unwrap(), pipeline.run(&direct).unwrap());
}

#[test]
fn test_local_timestamps_become_utc() {
    let table = Table::from_records(vec![
        indexmap! {
            "Datum / Uhrzeit" => Value::text("23.11.2025 23:10"),
            "Wind Speed (avg)" => Value::text("8.72"),
        },
        indexmap! {
            "Datum / Uhrzeit" => Value::text("2025-07-01 12:00:00"),
            "Wind Speed (avg)" => Value::Integer(3),
        },
    ]);
    let out = Pipeline::new().run(&table).unwrap();
    assert_eq!(out.get(0, "timestamp"), Some(&Value::text("2025-11-23T22:10:00Z")));
    assert_eq!(out.get(1, "timestamp"), Some(&Value::text("2025-07-01T10:00:00Z")));
}

#[test]
fn test_messages_are_deterministic() {
    let pipeline = Pipeline::with_config(PipelineConfig {
        messages: true,
        source: "local-onedrive".into(),
        ..PipelineConfig::default()
    });
    let table = raw_row("2025-11-23T23:10:00Z", Value::Null);

    let first = pipeline.run(&table).unwrap();
    let second = pipeline.run(&table).unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.get(0, "message"),
        Some(&Value::text(format_message(
            &Value::text("2025-11-23T23:10:00Z"),
            &Value::Null,
            &Value::Integer(-1),
        )))
    );
}

#[test]
fn test_process_semicolon_file() {
    let file = create_test_file(
        "Datum / Uhrzeit;Wind Speed (avg);Richtung\n\
         23.11.2025 23:10;8.72;NW\n\
         23.11.2025 23:20;;N\n",
        ".csv",
    );

    let result = Pipeline::new()
        .process_file(file.path(), &ParserConfig::default())
        .unwrap();

    assert_eq!(result.table.row_count(), 2);
    assert_eq!(result.table.get(0, "value"), Some(&Value::Float(8.72)));
    assert_eq!(result.table.get(1, "status"), Some(&Value::Integer(-1)));
    assert!(result.source.hash.starts_with("sha256:"));
    assert_eq!(result.source.format, "csv-semicolon");
}

#[test]
fn test_wrong_fixed_delimiter_is_repaired() {
    let file = create_test_file(
        "Datum / Uhrzeit;Wind Speed (avg)\n2025-11-23T23:10:00Z;8.72\n",
        ".csv",
    );

    // Reading with a comma leaves one fused column.
    let config = ParserConfig::with_delimiter(b',');
    let (raw, _) = read_table(file.path(), &config).unwrap();
    assert_eq!(raw.column_count(), 1);

    let result = Pipeline::new().process_file(file.path(), &config).unwrap();
    assert_eq!(result.table.get(0, "value"), Some(&Value::Float(8.72)));
}

#[test]
fn test_process_workbook_with_date_cells() {
    let mut workbook = Workbook::new();
    let date = Format::new().set_num_format("dd.mm.yyyy hh:mm");
    let sheet = workbook.add_worksheet();
    sheet.write_string(0, 0, "Datum / Uhrzeit").unwrap();
    sheet.write_string(0, 1, "Wind Speed (avg)").unwrap();
    sheet.write_string(0, 2, "Richtung").unwrap();
    // 23.11.2025 00:10 and 00:20 local time.
    sheet.write_number_with_format(1, 0, 45984.0 + 10.0 / 1440.0, &date).unwrap();
    sheet.write_number(1, 1, 8.72).unwrap();
    sheet.write_string(1, 2, "NW").unwrap();
    sheet.write_number_with_format(2, 0, 45984.0 + 20.0 / 1440.0, &date).unwrap();
    sheet.write_string(2, 2, "N").unwrap();

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("Mont Crosin.xlsx");
    std::fs::write(&path, workbook.save_to_buffer().unwrap()).unwrap();

    let (raw, source) = read_table(&path, &ParserConfig::default()).unwrap();
    assert_eq!(raw.columns(), &["Datum / Uhrzeit", "Wind Speed (avg)", "Richtung"]);
    assert_eq!(raw.get(0, "Datum / Uhrzeit"), Some(&Value::text("2025-11-23 00:10:00")));
    assert_eq!(raw.get(1, "Wind Speed (avg)"), Some(&Value::Null));
    assert_eq!(source.format, "xlsx");

    let result = Pipeline::new()
        .process_file(&path, &ParserConfig::default())
        .unwrap();
    assert_eq!(result.table.get(0, "timestamp"), Some(&Value::text("2025-11-22T23:10:00Z")));
    assert_eq!(result.table.get(0, "value"), Some(&Value::Float(8.72)));
    assert_eq!(result.table.get(0, "status"), Some(&Value::Integer(0)));
    assert_eq!(result.table.get(1, "timestamp"), Some(&Value::text("2025-11-22T23:20:00Z")));
    assert_eq!(result.table.get(1, "status"), Some(&Value::Integer(-1)));
}

#[test]
fn test_written_file_reads_back() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested/out.csv");

    let pipeline = Pipeline::with_config(PipelineConfig {
        messages: true,
        ..PipelineConfig::default()
    });
    let table = pipeline
        .run(&raw_row("2025-11-23T23:10:00Z", Value::Float(8.0)))
        .unwrap();
    output::write_delimited(&table, &path, EGRESS_DELIMITER).unwrap();

    let (back, _) = read_table(&path, &ParserConfig::with_delimiter(EGRESS_DELIMITER)).unwrap();
    assert_eq!(back.columns(), table.columns());
    assert_eq!(back.get(0, "value"), Some(&Value::text("8.0")));
    assert_eq!(back.get(0, "status"), Some(&Value::text("0")));
    assert_eq!(
        back.get(0, "message"),
        Some(&Value::text("Timestamp: 2025-11-23T23:10:00Z | Value: 8.0 | Status: 0"))
    );
}
