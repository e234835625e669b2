//! Canonical columns and the row status code.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::value::Value;

/// Name of the normalized timestamp column.
pub const TIMESTAMP: &str = "timestamp";
/// Name of the normalized measurement column.
pub const VALUE: &str = "value";
/// Name of the derived status column.
pub const STATUS: &str = "status";
/// Name of the provenance column added by message projection.
pub const SOURCE: &str = "source";
/// Name of the transmission string column added by message projection.
pub const MESSAGE: &str = "message";

/// The post-normalization column set.
pub const CANONICAL_COLUMNS: [&str; 3] = [TIMESTAMP, VALUE, STATUS];

/// Whether a row carries a measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    /// A value is present. Zero counts as present.
    Ok,
    /// The value is null.
    Missing,
}

impl Status {
    /// Status of a row given its `value` cell.
    pub fn of(value: &Value) -> Self {
        if value.is_null() {
            Status::Missing
        } else {
            Status::Ok
        }
    }

    /// Numeric code written to the `status` column.
    pub fn code(&self) -> i64 {
        match self {
            Status::Ok => 0,
            Status::Missing => -1,
        }
    }

    /// Parse a status code.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(Status::Ok),
            -1 => Some(Status::Missing),
            _ => None,
        }
    }
}

impl From<Status> for Value {
    fn from(status: Status) -> Self {
        Value::Integer(status.code())
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_of_value() {
        assert_eq!(Status::of(&Value::Float(8.72)), Status::Ok);
        assert_eq!(Status::of(&Value::Null), Status::Missing);
    }

    #[test]
    fn test_zero_counts_as_present() {
        assert_eq!(Status::of(&Value::Integer(0)), Status::Ok);
        assert_eq!(Status::of(&Value::Float(0.0)), Status::Ok);
    }

    #[test]
    fn test_codes() {
        assert_eq!(Status::Ok.code(), 0);
        assert_eq!(Status::Missing.code(), -1);
        assert_eq!(Status::from_code(-1), Some(Status::Missing));
        assert_eq!(Status::from_code(1), None);
        assert_eq!(Value::from(Status::Missing), Value::Integer(-1));
    }
}
