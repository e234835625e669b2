//! Explicit cell conversions used by the column normalizer.
//!
//! Each function converts one cell and reports a human-readable reason on
//! failure; callers attach the row and column.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;

use crate::table::Value;

/// Output layout of normalized timestamps.
pub const ISO_UTC_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// Timezone naive timestamps are read in unless configured otherwise.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Europe::Zurich;

/// Naive date-time layouts accepted from exports.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%d.%m.%Y %H:%M:%S",
    "%d.%m.%Y %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Date-only layouts, read as local midnight.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d.%m.%Y"];

/// Largest Excel serial (9999-12-31).
const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

/// Longest spring-forward gap searched when shifting nonexistent times.
const MAX_GAP_MINUTES: i64 = 180;

/// Convert a datetime-like cell to `YYYY-MM-DDTHH:MM:SSZ`.
///
/// Offset-carrying text is converted to UTC directly. Naive text and Excel
/// serial numbers are wall-clock times in `timezone`. A lone cell inside a
/// DST fold takes the earlier instant; use [`Localizer`] for whole columns.
pub fn to_iso_timestamp(value: &Value, timezone: Tz) -> Result<String, String> {
    Localizer::new(timezone).iso(value)
}

/// A timestamp cell before its wall-clock fields are placed in a timezone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Moment {
    /// The cell carried its own offset.
    Instant(DateTime<Utc>),
    /// Wall-clock time without an offset.
    WallClock(NaiveDateTime),
}

/// Parse a timestamp cell without resolving its timezone.
pub fn parse_moment(value: &Value) -> Result<Moment, String> {
    match value {
        Value::Null => Err("timestamp is empty".to_string()),
        Value::Text(s) => parse_timestamp_text(s),
        Value::Integer(i) => excel_serial_to_naive(*i as f64).map(Moment::WallClock),
        Value::Float(f) => excel_serial_to_naive(*f).map(Moment::WallClock),
    }
}

/// Places a column of wall-clock times in a timezone, one row at a time.
///
/// Inside a DST fold the first run through the repeated hour takes the
/// earlier offset. Once a wall-clock time is not later than the previous
/// ambiguous one, the clock has been set back and the later offset is used
/// until the fold ends.
#[derive(Debug, Clone)]
pub struct Localizer {
    timezone: Tz,
    fold: Option<Fold>,
}

#[derive(Debug, Clone, Copy)]
struct Fold {
    last: NaiveDateTime,
    repeated: bool,
}

impl Localizer {
    pub fn new(timezone: Tz) -> Self {
        Self { timezone, fold: None }
    }

    /// Convert the next cell of the column to ISO-8601 UTC.
    pub fn iso(&mut self, value: &Value) -> Result<String, String> {
        let utc = self.resolve(parse_moment(value)?)?;
        Ok(utc.format(ISO_UTC_FORMAT).to_string())
    }

    /// Resolve the next moment of the column.
    pub fn resolve(&mut self, moment: Moment) -> Result<DateTime<Utc>, String> {
        match moment {
            Moment::Instant(dt) => Ok(dt),
            Moment::WallClock(naive) => self.localize(naive),
        }
    }

    fn localize(&mut self, naive: NaiveDateTime) -> Result<DateTime<Utc>, String> {
        match self.timezone.from_local_datetime(&naive) {
            LocalResult::Single(dt) => {
                self.fold = None;
                Ok(dt.with_timezone(&Utc))
            }
            LocalResult::Ambiguous(earliest, latest) => {
                let repeated = self
                    .fold
                    .is_some_and(|fold| fold.repeated || naive <= fold.last);
                self.fold = Some(Fold { last: naive, repeated });
                let chosen = if repeated { latest } else { earliest };
                Ok(chosen.with_timezone(&Utc))
            }
            LocalResult::None => {
                self.fold = None;
                // Inside a spring-forward gap: shift to the first valid minute.
                (1..=MAX_GAP_MINUTES)
                    .find_map(|m| {
                        self.timezone
                            .from_local_datetime(&(naive + Duration::minutes(m)))
                            .earliest()
                    })
                    .map(|dt| dt.with_timezone(&Utc))
                    .ok_or_else(|| format!("{} does not exist in {}", naive, self.timezone))
            }
        }
    }
}

/// Convert a measurement cell to a number, keeping its numeric type.
///
/// Null-like tokens and NaN become `Null`.
pub fn to_numeric(value: &Value) -> Result<Value, String> {
    match value {
        Value::Null => Ok(Value::Null),
        Value::Integer(i) => Ok(Value::Integer(*i)),
        Value::Float(f) if f.is_nan() => Ok(Value::Null),
        Value::Float(f) => Ok(Value::Float(*f)),
        Value::Text(s) => {
            if Value::is_null_token(s) {
                return Ok(Value::Null);
            }
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Ok(Value::Integer(i));
            }
            match trimmed.parse::<f64>() {
                Ok(f) if f.is_nan() => Ok(Value::Null),
                Ok(f) => Ok(Value::Float(f)),
                Err(_) => Err("not a number".to_string()),
            }
        }
    }
}

fn parse_timestamp_text(text: &str) -> Result<Moment, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err("timestamp is empty".to_string());
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(Moment::Instant(dt.with_timezone(&Utc)));
    }

    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATE_FORMATS.iter().find_map(|fmt| {
                NaiveDate::parse_from_str(trimmed, fmt)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
        })
        .map(Moment::WallClock)
        .ok_or_else(|| "unrecognized date/time layout".to_string())
}

fn excel_serial_to_naive(serial: f64) -> Result<NaiveDateTime, String> {
    if !serial.is_finite() || serial < 0.0 || serial > MAX_EXCEL_SERIAL {
        return Err(format!("{} is outside the Excel date range", serial));
    }
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| "invalid Excel epoch".to_string())?;
    let seconds = (serial * 86_400.0).round() as i64;
    epoch
        .checked_add_signed(Duration::seconds(seconds))
        .ok_or_else(|| format!("{} overflows the date range", serial))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn iso(value: Value) -> String {
        to_iso_timestamp(&value, DEFAULT_TIMEZONE).unwrap()
    }

    #[test]
    fn test_iso_utc_passthrough() {
        assert_eq!(iso(Value::text("2025-11-23T23:10:00Z")), "2025-11-23T23:10:00Z");
    }

    #[test]
    fn test_offset_converted_to_utc() {
        assert_eq!(iso(Value::text("2025-11-24T00:10:00+01:00")), "2025-11-23T23:10:00Z");
    }

    #[test]
    fn test_naive_winter_time_is_cet() {
        assert_eq!(iso(Value::text("2025-11-24 00:10:00")), "2025-11-23T23:10:00Z");
        assert_eq!(iso(Value::text("24.11.2025 00:10")), "2025-11-23T23:10:00Z");
    }

    #[test]
    fn test_naive_summer_time_is_cest() {
        assert_eq!(iso(Value::text("2025-07-01 12:00:00")), "2025-07-01T10:00:00Z");
    }

    #[test]
    fn test_dst_fold_takes_earlier_instant() {
        // 02:30 happens twice on 2025-10-26 in Zurich.
        assert_eq!(iso(Value::text("2025-10-26 02:30")), "2025-10-26T00:30:00Z");
    }

    #[test]
    fn test_dst_fold_sequence_switches_offset() {
        // Clocks go back from 03:00 CEST to 02:00 CET on 2025-10-26.
        let mut localizer = Localizer::new(DEFAULT_TIMEZONE);
        let out: Vec<String> = ["01:50", "02:00", "02:50", "02:00", "02:50", "03:00"]
            .iter()
            .map(|t| localizer.iso(&Value::text(format!("2025-10-26 {}", t))).unwrap())
            .collect();
        assert_eq!(
            out,
            [
                "2025-10-25T23:50:00Z",
                "2025-10-26T00:00:00Z",
                "2025-10-26T00:50:00Z",
                "2025-10-26T01:00:00Z",
                "2025-10-26T01:50:00Z",
                "2025-10-26T02:00:00Z",
            ]
        );
    }

    #[test]
    fn test_repeated_fold_time_takes_later_offset() {
        let mut localizer = Localizer::new(DEFAULT_TIMEZONE);
        let cell = Value::text("26.10.2025 02:30");
        assert_eq!(localizer.iso(&cell).unwrap(), "2025-10-26T00:30:00Z");
        assert_eq!(localizer.iso(&cell).unwrap(), "2025-10-26T01:30:00Z");
    }

    #[test]
    fn test_dst_gap_shifts_forward() {
        // 02:30 does not exist on 2025-03-30 in Zurich; 03:00 CEST is 01:00 UTC.
        assert_eq!(iso(Value::text("2025-03-30 02:30")), "2025-03-30T01:00:00Z");
    }

    #[test]
    fn test_excel_serial() {
        // 45984.5 is 2025-11-23 12:00 local.
        assert_eq!(iso(Value::Float(45984.5)), "2025-11-23T11:00:00Z");
        assert_eq!(iso(Value::Integer(45984)), "2025-11-22T23:00:00Z");
    }

    #[test]
    fn test_date_only() {
        assert_eq!(iso(Value::text("2025-07-01")), "2025-06-30T22:00:00Z");
    }

    #[test]
    fn test_timestamp_failures() {
        assert!(to_iso_timestamp(&Value::Null, DEFAULT_TIMEZONE).is_err());
        assert!(to_iso_timestamp(&Value::text(""), DEFAULT_TIMEZONE).is_err());
        assert!(to_iso_timestamp(&Value::text("yesterday"), DEFAULT_TIMEZONE).is_err());
        assert!(to_iso_timestamp(&Value::Float(f64::NAN), DEFAULT_TIMEZONE).is_err());
    }

    #[test]
    fn test_to_numeric() {
        assert_eq!(to_numeric(&Value::text("8.72")), Ok(Value::Float(8.72)));
        assert_eq!(to_numeric(&Value::text(" 12 ")), Ok(Value::Integer(12)));
        assert_eq!(to_numeric(&Value::text("NA")), Ok(Value::Null));
        assert_eq!(to_numeric(&Value::text("nan")), Ok(Value::Null));
        assert_eq!(to_numeric(&Value::Float(f64::NAN)), Ok(Value::Null));
        assert_eq!(to_numeric(&Value::Integer(0)), Ok(Value::Integer(0)));
        assert!(to_numeric(&Value::text("calm")).is_err());
    }
}
