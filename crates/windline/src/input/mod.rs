//! Ingestion boundary: delimited text and spreadsheet files.

mod parser;
mod source;
mod spreadsheet;

use std::path::Path;

pub use parser::{Parser, ParserConfig, detect_delimiter};
pub use source::{SourceMetadata, content_hash};
pub use spreadsheet::{SPREADSHEET_EXTENSIONS, read_spreadsheet};

use crate::error::{Result, WindlineError};
use crate::table::Table;

/// Extensions read as delimited text.
pub const TEXT_EXTENSIONS: &[&str] = &["csv", "tsv", "txt"];

/// Returns true if `path` has an extension [`read_table`] understands.
pub fn is_supported(path: &Path) -> bool {
    extension(path).is_some_and(|ext| {
        SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) || TEXT_EXTENSIONS.contains(&ext.as_str())
    })
}

/// Read a table from a file, choosing the reader by extension.
pub fn read_table(path: impl AsRef<Path>, config: &ParserConfig) -> Result<(Table, SourceMetadata)> {
    let path = path.as_ref();
    match extension(path) {
        Some(ext) if SPREADSHEET_EXTENSIONS.contains(&ext.as_str()) => read_spreadsheet(path),
        Some(ext) if TEXT_EXTENSIONS.contains(&ext.as_str()) => {
            Parser::with_config(config.clone()).parse_file(path)
        }
        _ => Err(WindlineError::UnsupportedFormat(path.display().to_string())),
    }
}

fn extension(path: &Path) -> Option<String> {
    path.extension().map(|e| e.to_string_lossy().to_lowercase())
}
