//! Recovery for tables parsed with the wrong field separator.

use tracing::debug;

use crate::error::{Result, WindlineError};
use crate::table::{Table, Value};

/// Field separator used by the wind exports.
pub const DEFAULT_DELIMITER: char = ';';

/// Returns true if `table` looks like a fused, mis-delimited table.
///
/// That is the case only when the table has exactly one column whose name
/// contains `delimiter`.
pub fn needs_repair(table: &Table, delimiter: char) -> bool {
    matches!(table.columns(), [only] if only.contains(delimiter))
}

/// Split a single fused column back into its fields.
///
/// Tables that do not need repair are returned unchanged. Split values are
/// `Text`; type coercion is left to the normalizer.
pub fn repair_delimiter(table: &Table, delimiter: char) -> Result<Table> {
    if !needs_repair(table, delimiter) {
        return Ok(table.clone());
    }

    let header = &table.columns()[0];
    let columns: Vec<String> = header.split(delimiter).map(str::to_string).collect();
    let expected = columns.len();
    let mut out = Table::new(columns);

    for (row, values) in table.rows().enumerate() {
        let fused = values[0].to_string();
        let fields: Vec<Value> = fused.split(delimiter).map(Value::text).collect();
        if fields.len() != expected {
            return Err(WindlineError::RowShapeMismatch {
                row,
                found: fields.len(),
                expected,
            });
        }
        out.push_row(fields)?;
    }

    debug!(
        columns = expected,
        rows = out.row_count(),
        delimiter = %delimiter,
        "repaired fused column"
    );
    Ok(out)
}
