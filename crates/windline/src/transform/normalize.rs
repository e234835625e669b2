//! Column normalizer: raw export columns to `{timestamp, value, status}`.

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, WindlineError};
use crate::table::{CANONICAL_COLUMNS, Status, Table, Value};

use super::coerce::{self, DEFAULT_TIMEZONE, Localizer};

/// Datetime column of the wind exports.
pub const DEFAULT_TIMESTAMP_COLUMN: &str = "Datum / Uhrzeit";
/// Measurement column of the wind exports.
pub const DEFAULT_VALUE_COLUMN: &str = "Wind Speed (avg)";

/// Names of the two source columns consumed by the normalizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMap {
    /// Datetime-like column, renamed to `timestamp`.
    pub timestamp: String,
    /// Numeric measurement column, renamed to `value`.
    pub value: String,
}

impl ColumnMap {
    /// Create a column map.
    pub fn new(timestamp: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            timestamp: timestamp.into(),
            value: value.into(),
        }
    }

    /// A map that reads already-canonical columns, for re-normalizing output.
    pub fn canonical() -> Self {
        Self::new(crate::table::TIMESTAMP, crate::table::VALUE)
    }
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self::new(DEFAULT_TIMESTAMP_COLUMN, DEFAULT_VALUE_COLUMN)
    }
}

/// Renames and converts source columns into the canonical schema.
#[derive(Debug, Clone)]
pub struct Normalizer {
    columns: ColumnMap,
    timezone: Tz,
}

impl Normalizer {
    /// Create a normalizer reading naive times as `Europe/Zurich`.
    pub fn new(columns: ColumnMap) -> Self {
        Self {
            columns,
            timezone: DEFAULT_TIMEZONE,
        }
    }

    /// Set the timezone naive timestamps are read in.
    pub fn with_timezone(mut self, timezone: Tz) -> Self {
        self.timezone = timezone;
        self
    }

    /// The source column names.
    pub fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    /// Produce a table with exactly `{timestamp, value, status}`.
    ///
    /// Row count and order are preserved; every other column is dropped.
    /// Any unconvertible cell aborts the whole call. Ambiguous local times
    /// are resolved from row order, see [`Localizer`].
    pub fn normalize(&self, table: &Table) -> Result<Table> {
        let ts_index = table.require_column(&self.columns.timestamp)?;
        let value_index = table.require_column(&self.columns.value)?;

        let columns = CANONICAL_COLUMNS.iter().map(|c| c.to_string()).collect();
        let mut out = Table::new(columns);
        let mut localizer = Localizer::new(self.timezone);

        for (row, values) in table.rows().enumerate() {
            let raw_ts = &values[ts_index];
            let timestamp = localizer.iso(raw_ts).map_err(|reason| {
                WindlineError::TypeConversion {
                    row,
                    column: self.columns.timestamp.clone(),
                    value: raw_ts.to_string(),
                    reason,
                }
            })?;

            let raw_value = &values[value_index];
            let value = coerce::to_numeric(raw_value).map_err(|reason| {
                WindlineError::TypeConversion {
                    row,
                    column: self.columns.value.clone(),
                    value: raw_value.to_string(),
                    reason,
                }
            })?;

            let status = Status::of(&value);
            out.push_row(vec![Value::Text(timestamp), value, status.into()])?;
        }

        debug!(
            rows = out.row_count(),
            timestamp_column = %self.columns.timestamp,
            value_column = %self.columns.value,
            "normalized table"
        );
        Ok(out)
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new(ColumnMap::default())
    }
}

/// Normalize `table` with the default timezone.
pub fn normalize(table: &Table, columns: &ColumnMap) -> Result<Table> {
    Normalizer::new(columns.clone()).normalize(table)
}
