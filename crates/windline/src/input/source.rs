//! Provenance metadata for ingested files.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::table::Table;

/// Where an ingested table came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    pub file: String,
    pub path: PathBuf,
    /// `sha256:<hex>` of the raw bytes.
    pub hash: String,
    pub size_bytes: u64,
    /// Reader that produced the table: `csv-semicolon`, `xlsx`, ...
    pub format: String,
    /// Data rows, header excluded.
    pub row_count: usize,
    pub column_count: usize,
    pub loaded_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Describe `table`, read from `contents` at `path`.
    pub fn describe(path: &Path, contents: &[u8], format: impl Into<String>, table: &Table) -> Self {
        Self {
            file: path
                .file_name()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default(),
            path: path.to_path_buf(),
            hash: content_hash(contents),
            size_bytes: contents.len() as u64,
            format: format.into(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            loaded_at: Utc::now(),
        }
    }
}

/// Content hash in `sha256:<hex>` form.
pub fn content_hash(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("sha256:{:x}", hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_hash_is_stable() {
        assert_eq!(
            content_hash(b"abc"),
            "sha256:ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
    }

    #[test]
    fn test_describe_table() {
        let table = Table::new(vec!["timestamp".into(), "value".into()]);
        let meta = SourceMetadata::describe(
            Path::new("/data/16-12-2025/turbine.csv"),
            b"abc",
            "csv",
            &table,
        );
        assert_eq!(meta.file, "turbine.csv");
        assert_eq!(meta.size_bytes, 3);
        assert_eq!(meta.column_count, 2);
        assert!(meta.hash.starts_with("sha256:ba7816bf"));
    }
}
