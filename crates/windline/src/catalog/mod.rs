//! Technical-resource catalog: maps export files to TR-IDs.
//!
//! The catalog is a small CSV (`codeids.csv`) with a `Name` column and a
//! `Technische Ressourcen-ID` column. A data file belongs to the first
//! entry whose name occurs in its file stem.

use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::WINDOWS_1252;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Result, WindlineError};
use crate::input::Parser;
use crate::table::Value;

/// Column holding the plant name.
pub const NAME_COLUMN: &str = "Name";
/// Column holding the technical resource ID.
pub const TR_ID_COLUMN: &str = "Technische Ressourcen-ID";
/// Middle part of output file names.
pub const DEFAULT_FILENAME_SUFFIX: &str = "WindgeschwIstAnlage";

/// One catalog row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    /// Plant name, matched against file stems.
    pub name: String,
    /// Technical resource ID.
    pub tr_id: String,
}

/// The loaded catalog, in file order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    /// Create a catalog from entries.
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    /// Load a catalog file.
    ///
    /// UTF-8 is tried first; files that are not valid UTF-8 are decoded as
    /// Windows-1252, which covers the Latin-1 exports as well.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| WindlineError::io(path, e))?;
        let text = decode(&bytes);
        let catalog = Self::parse(&text)?;
        info!(path = %path.display(), entries = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    /// Parse catalog text.
    pub fn parse(text: &str) -> Result<Self> {
        let table = Parser::new().parse_str(text)?;
        let name_index = table.require_column(NAME_COLUMN)?;
        let id_index = table.require_column(TR_ID_COLUMN)?;

        let entries = table
            .rows()
            .filter_map(|row| {
                let name = cell_text(&row[name_index]);
                if name.is_empty() {
                    return None;
                }
                Some(CatalogEntry {
                    name,
                    tr_id: cell_text(&row[id_index]),
                })
            })
            .collect();

        Ok(Self { entries })
    }

    /// All entries.
    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the catalog has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// First entry whose name occurs in `file_stem`.
    pub fn match_file(&self, file_stem: &str) -> Option<&CatalogEntry> {
        let found = self.entries.iter().find(|e| file_stem.contains(&e.name));
        match found {
            Some(entry) => debug!(file_stem, name = %entry.name, tr_id = %entry.tr_id, "catalog match"),
            None => debug!(file_stem, "no catalog match"),
        }
        found
    }

    /// Check coverage in both directions between the catalog and `files`.
    pub fn coverage(&self, files: &[PathBuf]) -> CoverageReport {
        let stems: Vec<String> = files.iter().map(|f| file_stem(f)).collect();

        let (catalog_with_files, catalog_without_files): (Vec<_>, Vec<_>) = self
            .entries
            .iter()
            .cloned()
            .partition(|e| stems.iter().any(|s| s.contains(&e.name)));

        let mut files_with_match = Vec::new();
        let mut files_without_match = Vec::new();
        for (file, stem) in files.iter().zip(&stems) {
            let name = file_name(file);
            match self.entries.iter().find(|e| stem.contains(&e.name)) {
                Some(entry) => files_with_match.push(FileMatch {
                    file: name,
                    entry: entry.clone(),
                }),
                None => files_without_match.push(name),
            }
        }

        let report = CoverageReport {
            total_catalog_entries: self.entries.len(),
            total_files: files.len(),
            catalog_with_files,
            catalog_without_files,
            files_with_match,
            files_without_match,
        };
        report.log();
        report
    }
}

/// A data file and the entry it matched.
#[derive(Debug, Clone, Serialize)]
pub struct FileMatch {
    pub file: String,
    pub entry: CatalogEntry,
}

/// Bidirectional coverage between catalog and data files.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub total_catalog_entries: usize,
    pub total_files: usize,
    /// Entries with at least one matching file.
    pub catalog_with_files: Vec<CatalogEntry>,
    /// Entries no file matched.
    pub catalog_without_files: Vec<CatalogEntry>,
    pub files_with_match: Vec<FileMatch>,
    /// File names that matched no entry.
    pub files_without_match: Vec<String>,
}

impl CoverageReport {
    /// Returns true if every entry has a file and every file an entry.
    pub fn is_complete(&self) -> bool {
        self.catalog_without_files.is_empty() && self.files_without_match.is_empty()
    }

    fn log(&self) {
        info!(
            entries = self.total_catalog_entries,
            with_files = self.catalog_with_files.len(),
            files = self.total_files,
            with_match = self.files_with_match.len(),
            "catalog coverage"
        );
        for entry in &self.catalog_without_files {
            warn!(name = %entry.name, tr_id = %entry.tr_id, "catalog entry without file");
        }
        for file in &self.files_without_match {
            warn!(file = %file, "file without catalog match");
        }
    }
}

/// Output file name: `tecres_<TR-ID>_<suffix>_<date>.csv`.
pub fn build_filename(tr_id: &str, date: &str, suffix: &str) -> String {
    format!("tecres_{}_{}_{}.csv", tr_id, suffix, date)
}

fn decode(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(_) => {
            let (text, _, _) = WINDOWS_1252.decode(bytes);
            debug!("catalog decoded as windows-1252");
            text.into_owned()
        }
    }
}

fn cell_text(value: &Value) -> String {
    value.to_string().trim().to_string()
}

pub(crate) fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}
