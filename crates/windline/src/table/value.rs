//! Cell values.

use std::fmt;

use serde::{Deserialize, Serialize};

/// A single cell in a [`Table`](super::Table).
///
/// Cells carry their type explicitly so that every coercion point is a
/// visible conversion instead of an implicit cast.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// Missing or absent.
    #[default]
    Null,
    /// Whole number.
    Integer(i64),
    /// Floating-point number.
    Float(f64),
    /// Raw text, kept exactly as read.
    Text(String),
}

impl Value {
    /// Build a text value.
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    /// Returns true for [`Value::Null`].
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns true for integers and floats.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Value::Integer(_) | Value::Float(_))
    }

    /// Numeric view of the cell, if it holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Text view of the cell, if it holds text.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Check if a raw token represents a missing/null value.
    pub fn is_null_token(value: &str) -> bool {
        let trimmed = value.trim();
        trimmed.is_empty()
            || trimmed.eq_ignore_ascii_case("na")
            || trimmed.eq_ignore_ascii_case("n/a")
            || trimmed.eq_ignore_ascii_case("null")
            || trimmed.eq_ignore_ascii_case("none")
            || trimmed.eq_ignore_ascii_case("nil")
            || trimmed == "."
            || trimmed == "-"
    }
}

/// Render a float in its default decimal form.
///
/// Integral values keep a trailing `.0` so a float never reads back as an
/// integer.
fn format_float(f: f64) -> String {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < 1e16 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

/// Natural string form. `Null` renders as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Integer(i) => write!(f, "{}", i),
            Value::Float(x) => f.write_str(&format_float(*x)),
            Value::Text(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_natural_form() {
        assert_eq!(Value::Float(8.72).to_string(), "8.72");
        assert_eq!(Value::Float(8.0).to_string(), "8.0");
        assert_eq!(Value::Integer(-1).to_string(), "-1");
        assert_eq!(Value::text(" raw ").to_string(), " raw ");
        assert_eq!(Value::Null.to_string(), "");
    }

    #[test]
    fn test_extreme_floats_stay_positional() {
        assert_eq!(Value::Float(1e16).to_string(), "10000000000000000");
        assert_eq!(Value::Float(1e-5).to_string(), "0.00001");
        assert_eq!(Value::Float(1e15).to_string(), "1000000000000000.0");
    }

    #[test]
    fn test_is_null_token() {
        assert!(Value::is_null_token(""));
        assert!(Value::is_null_token("  "));
        assert!(Value::is_null_token("NA"));
        assert!(Value::is_null_token("n/a"));
        assert!(Value::is_null_token("None"));
        assert!(Value::is_null_token("-"));
        assert!(!Value::is_null_token("0"));
        assert!(!Value::is_null_token("8.72"));
    }

    #[test]
    fn test_from_option() {
        assert_eq!(Value::from(None::<f64>), Value::Null);
        assert_eq!(Value::from(Some(1.5)), Value::Float(1.5));
    }
}
