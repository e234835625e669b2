//! Error types for the windline library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for windline operations.
#[derive(Debug, Error)]
pub enum WindlineError {
    /// A required column is absent from the table.
    #[error("Missing column '{column}'")]
    MissingColumn { column: String },

    /// A cell could not be coerced to the type its column requires.
    #[error("Cannot convert {value:?} in column '{column}' at row {row}: {reason}")]
    TypeConversion {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },

    /// A delimiter-split row disagrees with the header's field count.
    #[error("Row {row} splits into {found} fields, header has {expected}")]
    RowShapeMismatch {
        row: usize,
        found: usize,
        expected: usize,
    },

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Error reading a spreadsheet workbook.
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    /// Error opening or extracting a ZIP archive.
    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Empty file or no data to process.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// File format not supported.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// An expected input folder or archive is not there.
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// TOML settings could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl WindlineError {
    /// Shorthand for a missing column error.
    pub fn missing_column(column: impl Into<String>) -> Self {
        WindlineError::MissingColumn {
            column: column.into(),
        }
    }

    /// Wrap an IO error with the path it happened on.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WindlineError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for windline operations.
pub type Result<T> = std::result::Result<T, WindlineError>;
