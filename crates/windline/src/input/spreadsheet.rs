//! Spreadsheet ingestion via calamine.

use std::fs;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use tracing::{debug, warn};

use crate::error::{Result, WindlineError};
use crate::table::{Table, Value};

use super::source::SourceMetadata;

/// Extensions read as workbooks.
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Read the first worksheet of a workbook; its first row is the header.
pub fn read_spreadsheet(path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
    let path = path.as_ref();
    let contents = fs::read(path).map_err(|e| WindlineError::io(path, e))?;

    let mut workbook = open_workbook_auto(path)?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| WindlineError::EmptyData(format!("No worksheets in {}", path.display())))??;

    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(cells) => cells.iter().map(header_name).collect(),
        None => {
            return Err(WindlineError::EmptyData(format!(
                "First worksheet of {} is empty",
                path.display()
            )));
        }
    };

    let mut table = Table::new(headers);
    for (row, cells) in rows.enumerate() {
        let values = cells
            .iter()
            .enumerate()
            .map(|(col, cell)| cell_value(cell, row, col))
            .collect();
        table.push_row(values)?;
    }

    let format = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_else(|| "spreadsheet".to_string());

    let metadata = SourceMetadata::describe(path, &contents, format, &table);

    debug!(file = %metadata.file, rows = metadata.row_count, "read worksheet");
    Ok((table, metadata))
}

fn header_name(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

/// Layout of date cells handed to the normalizer as local wall-clock text.
const WALL_CLOCK_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// Convert a worksheet cell.
///
/// Date cells become wall-clock text, honoring the workbook's 1900 or 1904
/// date system. Duration cells keep their raw serial.
fn cell_value(cell: &Data, row: usize, col: usize) -> Value {
    match cell {
        Data::Empty => Value::Null,
        Data::Int(i) => Value::Integer(*i),
        Data::Float(f) => Value::Float(*f),
        Data::String(s) => Value::Text(s.clone()),
        Data::Bool(b) => Value::Text(b.to_string()),
        Data::DateTime(dt) if dt.is_duration() => Value::Float(dt.as_f64()),
        Data::DateTime(dt) => match dt.as_datetime() {
            Some(naive) => Value::Text(naive.format(WALL_CLOCK_FORMAT).to_string()),
            None => {
                warn!(row, col, serial = dt.as_f64(), "date cell out of range, kept as serial");
                Value::Float(dt.as_f64())
            }
        },
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::Text(s.clone()),
        Data::Error(e) => {
            warn!(row, col, error = ?e, "spreadsheet error cell read as null");
            Value::Null
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::{ExcelDateTime, ExcelDateTimeType};

    #[test]
    fn test_cell_values() {
        assert_eq!(cell_value(&Data::Empty, 0, 0), Value::Null);
        assert_eq!(cell_value(&Data::Float(8.72), 0, 0), Value::Float(8.72));
        assert_eq!(cell_value(&Data::Int(3), 0, 0), Value::Integer(3));
        assert_eq!(cell_value(&Data::Bool(true), 0, 0), Value::text("true"));
        assert_eq!(
            cell_value(&Data::Error(calamine::CellErrorType::NA), 0, 0),
            Value::Null
        );
    }

    #[test]
    fn test_date_cells_honor_date_system() {
        let serial = |value, is_1904| {
            Data::DateTime(ExcelDateTime::new(value, ExcelDateTimeType::DateTime, is_1904))
        };
        // 2025-11-23 00:10 in each date system.
        assert_eq!(
            cell_value(&serial(45984.0 + 10.0 / 1440.0, false), 0, 0),
            Value::text("2025-11-23 00:10:00")
        );
        assert_eq!(
            cell_value(&serial(44522.0 + 10.0 / 1440.0, true), 0, 0),
            Value::text("2025-11-23 00:10:00")
        );
    }

    #[test]
    fn test_duration_cells_keep_serial() {
        let cell = Data::DateTime(ExcelDateTime::new(0.5, ExcelDateTimeType::TimeDelta, false));
        assert_eq!(cell_value(&cell, 0, 0), Value::Float(0.5));
    }

    #[test]
    fn test_header_names() {
        assert_eq!(header_name(&Data::String("Datum / Uhrzeit".into())), "Datum / Uhrzeit");
        assert_eq!(header_name(&Data::Empty), "");
    }

    #[test]
    fn test_missing_workbook_is_io_error() {
        let err = read_spreadsheet("/nonexistent/turbine.xlsx").unwrap_err();
        assert!(matches!(err, WindlineError::Io { .. }));
    }
}
