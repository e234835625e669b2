//! Message projection: a human-readable transmission string per row.

use std::borrow::Cow;

use crate::error::Result;
use crate::table::{MESSAGE, SOURCE, STATUS, TIMESTAMP, Table, VALUE, Value};

/// Provenance tag used when none is configured.
pub const DEFAULT_SOURCE: &str = "local";

/// Render the transmission string for one row.
pub fn format_message(timestamp: &Value, value: &Value, status: &Value) -> String {
    format!(
        "Timestamp: {} | Value: {} | Status: {}",
        field(timestamp),
        field(value),
        field(status)
    )
}

fn field(value: &Value) -> Cow<'_, str> {
    match value {
        Value::Null => Cow::Borrowed("null"),
        Value::Text(s) => Cow::Borrowed(s),
        other => Cow::Owned(other.to_string()),
    }
}

/// Tag every row with `source` and append its `message`.
///
/// Requires the canonical columns. Existing columns are kept; `source` and
/// `message` are appended, or overwritten where already present.
pub fn project_messages(table: &Table, source: &str) -> Result<Table> {
    let ts_index = table.require_column(TIMESTAMP)?;
    let value_index = table.require_column(VALUE)?;
    let status_index = table.require_column(STATUS)?;

    let messages: Vec<Value> = table
        .rows()
        .map(|row| {
            Value::Text(format_message(
                &row[ts_index],
                &row[value_index],
                &row[status_index],
            ))
        })
        .collect();
    let sources = vec![Value::text(source); table.row_count()];

    let mut out = table.clone();
    out.set_column(SOURCE, sources);
    out.set_column(MESSAGE, messages);
    Ok(out)
}
