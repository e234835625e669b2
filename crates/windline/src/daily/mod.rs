//! Daily batch run over a dated ZIP export.
//!
//! The export folder holds one subfolder per day (`dd-mm-YYYY`) with one or
//! more ZIP archives. The newest valid archive is extracted and every data
//! file in it goes through the pipeline and is written as `;`-separated CSV
//! named after its catalog TR-ID.

mod archive;

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use serde::Serialize;
use tracing::{error, info, warn};

use crate::catalog::{self, Catalog, DEFAULT_FILENAME_SUFFIX};
use crate::error::{Result, WindlineError};
use crate::input::ParserConfig;
use crate::output::{self, EGRESS_DELIMITER};
use crate::pipeline::{Pipeline, PipelineConfig};

pub use archive::{collect_data_files, extract, find_latest_zip};

/// Date format of the daily folders.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// Settings for one daily run.
#[derive(Debug, Clone)]
pub struct DailyConfig {
    /// Folder holding the dated subfolders.
    pub source_dir: PathBuf,
    /// Local output root.
    pub local_output_dir: PathBuf,
    /// Second output root, e.g. a synced OneDrive folder.
    pub mirror_output_dir: Option<PathBuf>,
    /// Date folder to process, `dd-mm-YYYY`.
    pub date: String,
    /// Name unmatched files after their stem instead of failing them.
    pub allow_fallback: bool,
    pub filename_suffix: String,
    pub pipeline: PipelineConfig,
    pub parser: ParserConfig,
}

impl DailyConfig {
    /// Configuration for `date` with default pipeline settings.
    pub fn new(
        source_dir: impl Into<PathBuf>,
        local_output_dir: impl Into<PathBuf>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            source_dir: source_dir.into(),
            local_output_dir: local_output_dir.into(),
            mirror_output_dir: None,
            date: date.into(),
            allow_fallback: false,
            filename_suffix: DEFAULT_FILENAME_SUFFIX.to_string(),
            pipeline: PipelineConfig::default(),
            parser: ParserConfig::default(),
        }
    }
}

/// What happened to one data file.
#[derive(Debug, Clone, Serialize)]
pub struct FileOutcome {
    /// Name of the extracted data file.
    pub source: String,
    /// Local output path, when one was written.
    pub output: Option<PathBuf>,
    pub tr_id: Option<String>,
    pub rows: usize,
    pub size_kb: f64,
    pub source_hash: Option<String>,
    pub success: bool,
    pub error: Option<String>,
}

impl FileOutcome {
    fn failed(source: String, tr_id: Option<String>, error: impl Into<String>) -> Self {
        Self {
            source,
            output: None,
            tr_id,
            rows: 0,
            size_kb: 0.0,
            source_hash: None,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Totals for a daily run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DailySummary {
    pub total_files: usize,
    pub successful: usize,
    pub failed: usize,
    pub files: Vec<FileOutcome>,
    /// Local outputs that were written.
    pub processed_paths: Vec<PathBuf>,
}

impl DailySummary {
    /// Today's local date as a daily folder name.
    pub fn today() -> String {
        Local::now().format(DATE_FORMAT).to_string()
    }

    fn record(&mut self, outcome: FileOutcome) {
        if outcome.success {
            self.successful += 1;
            if let Some(path) = &outcome.output {
                self.processed_paths.push(path.clone());
            }
        } else {
            self.failed += 1;
        }
        self.files.push(outcome);
    }
}

/// Runs the daily batch against a catalog.
pub struct DailyRun<'a> {
    config: DailyConfig,
    catalog: &'a Catalog,
    pipeline: Pipeline,
}

impl<'a> DailyRun<'a> {
    pub fn new(config: DailyConfig, catalog: &'a Catalog) -> Self {
        let pipeline = Pipeline::with_config(config.pipeline.clone());
        Self {
            config,
            catalog,
            pipeline,
        }
    }

    /// Process the configured date.
    ///
    /// Fails only when there is nothing to process. Errors on individual
    /// files are recorded in the summary.
    pub fn run(&self) -> Result<DailySummary> {
        let date = &self.config.date;
        let date_folder = self.config.source_dir.join(date);
        if !date_folder.is_dir() {
            return Err(WindlineError::MissingInput(format!(
                "Date folder not found: {}",
                date_folder.display()
            )));
        }
        info!(date = %date, folder = %date_folder.display(), "starting daily run");

        let zip = find_latest_zip(&date_folder)?;
        let extract_dir = self.config.local_output_dir.join(format!("extracted_{}", date));
        extract(&zip, &extract_dir)?;

        let files = collect_data_files(&extract_dir);
        if files.is_empty() {
            warn!(dir = %extract_dir.display(), "archive contained no data files");
        }
        self.catalog.coverage(&files);

        let local_dir = self.config.local_output_dir.join(date);
        create_dir(&local_dir)?;
        let mirror_dir = match &self.config.mirror_output_dir {
            Some(mirror) => {
                let dir = mirror.join(date);
                create_dir(&dir)?;
                Some(dir)
            }
            None => None,
        };

        let mut summary = DailySummary {
            total_files: files.len(),
            ..DailySummary::default()
        };
        for (i, file) in files.iter().enumerate() {
            info!(file = %file.display(), "[{}/{}] processing", i + 1, files.len());
            let outcome = self.process_one(file, &local_dir, mirror_dir.as_deref());
            if let Some(reason) = &outcome.error {
                error!(file = %outcome.source, error = %reason, "file failed");
            }
            summary.record(outcome);
        }

        info!(
            total = summary.total_files,
            successful = summary.successful,
            failed = summary.failed,
            "daily run complete"
        );
        Ok(summary)
    }

    fn process_one(&self, file: &Path, local_dir: &Path, mirror_dir: Option<&Path>) -> FileOutcome {
        let name = file
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let stem = catalog::file_stem(file);

        let (output_name, tr_id) = match self.catalog.match_file(&stem) {
            Some(entry) => (
                catalog::build_filename(&entry.tr_id, &self.config.date, &self.config.filename_suffix),
                Some(entry.tr_id.clone()),
            ),
            None if self.config.allow_fallback => {
                warn!(file = %name, "no catalog match, using file stem");
                (format!("{}_{}.csv", stem, self.config.date), None)
            }
            None => return FileOutcome::failed(name, None, "No catalog match"),
        };

        match self.write_outputs(file, &output_name, local_dir, mirror_dir) {
            Ok((output, rows, size_bytes, hash)) => FileOutcome {
                source: name,
                output: Some(output),
                tr_id,
                rows,
                size_kb: (size_bytes as f64 / 1024.0 * 100.0).round() / 100.0,
                source_hash: Some(hash),
                success: true,
                error: None,
            },
            Err(e) => FileOutcome::failed(name, tr_id, e.to_string()),
        }
    }

    fn write_outputs(
        &self,
        file: &Path,
        output_name: &str,
        local_dir: &Path,
        mirror_dir: Option<&Path>,
    ) -> Result<(PathBuf, usize, u64, String)> {
        let processed = self.pipeline.process_file(file, &self.config.parser)?;

        let local_path = local_dir.join(output_name);
        output::write_delimited(&processed.table, &local_path, EGRESS_DELIMITER)?;
        if let Some(dir) = mirror_dir {
            output::write_delimited(&processed.table, dir.join(output_name), EGRESS_DELIMITER)?;
        }

        let size = fs::metadata(&local_path)
            .map_err(|e| WindlineError::io(&local_path, e))?
            .len();
        info!(output = %local_path.display(), rows = processed.table.row_count(), "saved");
        Ok((local_path, processed.table.row_count(), size, processed.source.hash))
    }
}

fn create_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| WindlineError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_today_format() {
        let today = DailySummary::today();
        assert_eq!(today.len(), 10);
        assert!(chrono::NaiveDate::parse_from_str(&today, DATE_FORMAT).is_ok());
    }

    #[test]
    fn test_missing_date_folder() {
        let dir = TempDir::new().unwrap();
        let config = DailyConfig::new(dir.path(), dir.path().join("out"), "01-01-2025");
        let catalog = Catalog::default();
        let err = DailyRun::new(config, &catalog).run().unwrap_err();
        assert!(matches!(err, WindlineError::MissingInput(_)));
    }

    #[test]
    fn test_summary_counts() {
        let mut summary = DailySummary::default();
        summary.record(FileOutcome::failed("a.csv".into(), None, "No catalog match"));
        summary.record(FileOutcome {
            output: Some(PathBuf::from("out/b.csv")),
            success: true,
            error: None,
            ..FileOutcome::failed("b.csv".into(), None, "")
        });
        assert_eq!(summary.successful, 1);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.processed_paths, vec![PathBuf::from("out/b.csv")]);
    }
}
