//! Delimited-text serialization.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::{Result, WindlineError};
use crate::table::Table;

/// Field separator for files handed back to storage.
pub const EGRESS_DELIMITER: u8 = b';';

/// Write a header line plus rows to any writer. `Null` becomes an empty field.
pub fn write_table<W: Write>(table: &Table, writer: W, delimiter: u8) -> Result<()> {
    let mut csv_writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);

    csv_writer.write_record(table.columns())?;
    for row in table.rows() {
        csv_writer.write_record(row.iter().map(|v| v.to_string()))?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}

/// Serialize a table to a string.
pub fn to_delimited_string(table: &Table, delimiter: u8) -> Result<String> {
    let mut buf = Vec::new();
    write_table(table, &mut buf, delimiter)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a table to `path`, creating parent directories as needed.
pub fn write_delimited(table: &Table, path: impl AsRef<Path>, delimiter: u8) -> Result<()> {
    let path = path.as_ref();

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| WindlineError::io(parent, e))?;
        }
    }

    let file = File::create(path).map_err(|e| WindlineError::io(path, e))?;
    write_table(table, BufWriter::new(file), delimiter)
}
