//! Output verification and data quality reports.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::{Result, WindlineError};
use crate::input::{Parser, ParserConfig};
use crate::table::{STATUS, TIMESTAMP, Table, VALUE, Value};
use crate::transform::coerce;

static ISO_UTC: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(\.\d+)?Z$").expect("valid ISO regex")
});

/// Quality metrics for one table.
#[derive(Debug, Clone, Serialize)]
pub struct QualityReport {
    pub total_rows: usize,
    pub total_columns: usize,
    pub columns: Vec<String>,
    pub missing_values_total: usize,
    pub missing_by_column: IndexMap<String, usize>,
    /// Rows identical to an earlier row.
    pub duplicate_rows: usize,
    /// Share of non-missing cells, in percent.
    pub completeness_pct: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<TimestampQuality>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<ValueQuality>,
    /// Row count per rendered status value, in first-seen order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_distribution: Option<IndexMap<String, usize>>,
}

/// Checks on the `timestamp` column.
#[derive(Debug, Clone, Serialize)]
pub struct TimestampQuality {
    pub nulls: usize,
    pub unique: usize,
    /// Every non-null timestamp is ISO-8601 UTC with a `Z`.
    pub iso_utc: bool,
}

/// Range of the `value` column.
#[derive(Debug, Clone, Serialize)]
pub struct ValueQuality {
    pub nulls: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}

/// A cell counts as missing when it is null or a null-like token.
fn is_missing(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Text(s) => Value::is_null_token(s),
        Value::Float(f) => f.is_nan(),
        Value::Integer(_) => false,
    }
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

impl QualityReport {
    /// Compute the report for `table`.
    pub fn from_table(table: &Table) -> Self {
        let mut missing_by_column = IndexMap::new();
        for name in table.columns() {
            let missing = table
                .column(name)
                .map(|values| values.filter(|v| is_missing(v)).count())
                .unwrap_or(0);
            missing_by_column.insert(name.clone(), missing);
        }
        let missing_values_total: usize = missing_by_column.values().sum();

        let mut seen = HashSet::new();
        let duplicate_rows = table
            .rows()
            .filter(|row| {
                let key: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                !seen.insert(key.join("\u{1f}"))
            })
            .count();

        let total_cells = table.row_count() * table.column_count();
        let completeness_pct = if total_cells > 0 {
            round2((1.0 - missing_values_total as f64 / total_cells as f64) * 100.0)
        } else {
            100.0
        };

        Self {
            total_rows: table.row_count(),
            total_columns: table.column_count(),
            columns: table.columns().to_vec(),
            missing_values_total,
            missing_by_column,
            duplicate_rows,
            completeness_pct,
            timestamp: timestamp_quality(table),
            value: value_quality(table),
            status_distribution: status_distribution(table),
        }
    }
}

fn timestamp_quality(table: &Table) -> Option<TimestampQuality> {
    let values: Vec<&Value> = table.column(TIMESTAMP)?.collect();
    let present: Vec<String> = values
        .iter()
        .filter(|v| !is_missing(v))
        .map(|v| v.to_string())
        .collect();
    let unique: HashSet<&String> = present.iter().collect();

    Some(TimestampQuality {
        nulls: values.len() - present.len(),
        unique: unique.len(),
        iso_utc: present.iter().all(|s| ISO_UTC.is_match(s)),
    })
}

fn value_quality(table: &Table) -> Option<ValueQuality> {
    let values: Vec<&Value> = table.column(VALUE)?.collect();
    let nulls = values.iter().filter(|v| is_missing(v)).count();
    // Delimited files come back as text; parse them the way the normalizer does.
    let numbers: Vec<f64> = values
        .iter()
        .filter_map(|v| coerce::to_numeric(v).ok())
        .filter_map(|v| v.as_f64())
        .collect();

    let (min, max, mean) = if numbers.is_empty() {
        (None, None, None)
    } else {
        let min = numbers.iter().copied().fold(f64::INFINITY, f64::min);
        let max = numbers.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let mean = numbers.iter().sum::<f64>() / numbers.len() as f64;
        (Some(min), Some(max), Some(mean))
    };

    Some(ValueQuality {
        nulls,
        min,
        max,
        mean,
    })
}

fn status_distribution(table: &Table) -> Option<IndexMap<String, usize>> {
    let mut counts = IndexMap::new();
    for value in table.column(STATUS)? {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    Some(counts)
}

/// Result of reading back a written file.
#[derive(Debug, Clone, Serialize)]
pub struct FileVerification {
    pub file: String,
    pub path: PathBuf,
    pub size_bytes: u64,
    pub report: QualityReport,
}

/// Read a delimited file and compute its quality report.
pub fn verify_csv_file(path: impl AsRef<Path>, delimiter: u8) -> Result<FileVerification> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(WindlineError::MissingInput(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let parser = Parser::with_config(ParserConfig::with_delimiter(delimiter));
    let (table, source) = parser.parse_file(path)?;
    let report = QualityReport::from_table(&table);
    debug!(file = %source.file, rows = report.total_rows, "verified file");

    Ok(FileVerification {
        file: source.file,
        path: source.path,
        size_bytes: source.size_bytes,
        report,
    })
}

/// A file that could not be read back.
#[derive(Debug, Clone, Serialize)]
pub struct VerificationFailure {
    pub path: PathBuf,
    pub error: String,
}

/// Files verified in one pass, failures kept beside the successes.
#[derive(Debug, Clone, Default, Serialize)]
pub struct VerificationRun {
    pub verified: Vec<FileVerification>,
    pub failed: Vec<VerificationFailure>,
}

impl VerificationRun {
    /// Verify every path; an unreadable file is recorded and skipped.
    pub fn check(paths: &[PathBuf], delimiter: u8) -> Self {
        let mut run = Self::default();
        for path in paths {
            match verify_csv_file(path, delimiter) {
                Ok(verification) => run.verified.push(verification),
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "verification failed");
                    run.failed.push(VerificationFailure {
                        path: path.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }
        run
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Per-file line of a processing summary.
#[derive(Debug, Clone, Serialize)]
pub struct FileSize {
    pub name: String,
    pub rows: usize,
    pub size_kb: f64,
}

/// Aggregate size and row counts over processed files.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProcessingSummary {
    pub total_files: usize,
    pub total_rows: usize,
    pub total_size_kb: f64,
    pub total_size_mb: f64,
    pub files: Vec<FileSize>,
}

impl ProcessingSummary {
    /// Summarize `paths`. Files that cannot be read are logged and skipped.
    pub fn from_files(paths: &[PathBuf], delimiter: u8) -> Self {
        let mut summary = ProcessingSummary {
            total_files: paths.len(),
            ..Self::default()
        };

        for path in paths {
            match verify_csv_file(path, delimiter) {
                Ok(verification) => {
                    let size_kb = verification.size_bytes as f64 / 1024.0;
                    summary.total_size_kb += size_kb;
                    summary.total_rows += verification.report.total_rows;
                    summary.files.push(FileSize {
                        name: verification.file,
                        rows: verification.report.total_rows,
                        size_kb: round2(size_kb),
                    });
                }
                Err(e) => warn!(path = %path.display(), error = %e, "skipping unreadable file"),
            }
        }

        summary.total_size_mb = round2(summary.total_size_kb / 1024.0);
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn normalized() -> Table {
        Table::with_rows(
            vec!["timestamp".into(), "value".into(), "status".into()],
            vec![
                vec![Value::text("2025-11-23T23:10:00Z"), Value::Float(8.0), Value::Integer(0)],
                vec![Value::text("2025-11-23T23:20:00Z"), Value::Null, Value::Integer(-1)],
                vec![Value::text("2025-11-23T23:30:00Z"), Value::Float(4.0), Value::Integer(0)],
                vec![Value::text("2025-11-23T23:30:00Z"), Value::Float(4.0), Value::Integer(0)],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_report_counts() {
        let report = QualityReport::from_table(&normalized());
        assert_eq!(report.total_rows, 4);
        assert_eq!(report.missing_values_total, 1);
        assert_eq!(report.missing_by_column["value"], 1);
        assert_eq!(report.duplicate_rows, 1);
        assert_eq!(report.completeness_pct, 91.67);
    }

    #[test]
    fn test_column_checks() {
        let report = QualityReport::from_table(&normalized());
        let ts = report.timestamp.unwrap();
        assert!(ts.iso_utc);
        assert_eq!(ts.unique, 3);

        let value = report.value.unwrap();
        assert_eq!(value.min, Some(4.0));
        assert_eq!(value.max, Some(8.0));
        assert_eq!(value.mean, Some(16.0 / 3.0));

        let status = report.status_distribution.unwrap();
        assert_eq!(status["0"], 3);
        assert_eq!(status["-1"], 1);
        assert_eq!(status.keys().next().map(String::as_str), Some("0"));
    }

    #[test]
    fn test_non_iso_timestamps_flagged() {
        let table = Table::with_rows(
            vec!["timestamp".into()],
            vec![vec![Value::text("23.11.2025 23:10")]],
        )
        .unwrap();
        let report = QualityReport::from_table(&table);
        assert!(!report.timestamp.unwrap().iso_utc);
        assert!(report.value.is_none());
    }

    #[test]
    fn test_empty_table_is_complete() {
        let report = QualityReport::from_table(&Table::new(vec!["a".into()]));
        assert_eq!(report.completeness_pct, 100.0);
    }

    #[test]
    fn test_verify_missing_file() {
        let err = verify_csv_file("/nonexistent/out.csv", b';').unwrap_err();
        assert!(matches!(err, WindlineError::MissingInput(_)));
    }

    #[test]
    fn test_verification_continues_past_unreadable_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let good = dir.path().join("good.csv");
        std::fs::write(&good, "timestamp;value;status\n2025-11-23T23:10:00Z;8.0;0\n").unwrap();
        let missing = dir.path().join("missing.csv");

        let run = VerificationRun::check(&[missing.clone(), good], b';');
        assert!(!run.is_clean());
        assert_eq!(run.failed.len(), 1);
        assert_eq!(run.failed[0].path, missing);
        assert_eq!(run.verified.len(), 1);
        assert_eq!(run.verified[0].report.total_rows, 1);
    }
}
