//! Locating and extracting the day's ZIP export.

use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, info, warn};
use walkdir::WalkDir;
use zip::ZipArchive;

use crate::error::{Result, WindlineError};
use crate::input::SPREADSHEET_EXTENSIONS;

/// Newest `*.zip` in `folder` that opens as an archive.
pub fn find_latest_zip(folder: &Path) -> Result<PathBuf> {
    let entries = fs::read_dir(folder).map_err(|e| WindlineError::io(folder, e))?;

    let mut candidates: Vec<(SystemTime, PathBuf)> = entries
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| has_extension(path, "zip"))
        .filter_map(|path| {
            let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
            Some((modified, path))
        })
        .collect();

    if candidates.is_empty() {
        return Err(WindlineError::MissingInput(format!(
            "No ZIP files in {}",
            folder.display()
        )));
    }
    candidates.sort_by(|a, b| b.0.cmp(&a.0));
    debug!(count = candidates.len(), "zip candidates");

    for (_, path) in candidates {
        match File::open(&path).map(ZipArchive::new) {
            Ok(Ok(_)) => {
                info!(zip = %path.display(), "selected archive");
                return Ok(path);
            }
            Ok(Err(e)) => warn!(zip = %path.display(), error = %e, "invalid archive, skipping"),
            Err(e) => warn!(zip = %path.display(), error = %e, "unreadable archive, skipping"),
        }
    }

    Err(WindlineError::MissingInput(format!(
        "No valid ZIP files in {}",
        folder.display()
    )))
}

/// Extract `zip` into `dest`, replacing whatever was there.
pub fn extract(zip: &Path, dest: &Path) -> Result<()> {
    if dest.exists() {
        fs::remove_dir_all(dest).map_err(|e| WindlineError::io(dest, e))?;
    }
    fs::create_dir_all(dest).map_err(|e| WindlineError::io(dest, e))?;

    let file = File::open(zip).map_err(|e| WindlineError::io(zip, e))?;
    let mut archive = ZipArchive::new(file)?;
    archive.extract(dest)?;
    info!(files = archive.len(), dest = %dest.display(), "extracted archive");
    Ok(())
}

/// Spreadsheet and CSV files under `root`, sorted by path.
pub fn collect_data_files(root: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            SPREADSHEET_EXTENSIONS
                .iter()
                .any(|ext| has_extension(path, ext))
                || has_extension(path, "csv")
        })
        .collect();
    files.sort();
    files
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
}
