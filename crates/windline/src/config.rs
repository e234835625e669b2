//! Settings file and environment overrides.
//!
//! ```toml
//! [pipeline]
//! source = "local-onedrive"
//! timezone = "Europe/Zurich"
//!
//! [paths]
//! onedrive_folder = "/home/ops/OneDrive"
//! data_subfolder = "Data"
//!
//! [daily]
//! allow_fallback = false
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::DEFAULT_FILENAME_SUFFIX;
use crate::daily::DailyConfig;
use crate::error::{Result, WindlineError};
use crate::input::ParserConfig;
use crate::pipeline::PipelineConfig;
use crate::transform::{
    ColumnMap, DEFAULT_DELIMITER, DEFAULT_SOURCE, DEFAULT_TIMESTAMP_COLUMN, DEFAULT_VALUE_COLUMN,
};

/// All settings, grouped as in the TOML file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub pipeline: PipelineSettings,
    pub paths: PathSettings,
    pub daily: DailySettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineSettings {
    pub source: String,
    pub delimiter: char,
    pub timestamp_column: String,
    pub value_column: String,
    /// IANA name, e.g. `Europe/Zurich`.
    pub timezone: String,
    pub messages: bool,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            delimiter: DEFAULT_DELIMITER,
            timestamp_column: DEFAULT_TIMESTAMP_COLUMN.to_string(),
            value_column: DEFAULT_VALUE_COLUMN.to_string(),
            timezone: "Europe/Zurich".to_string(),
            messages: false,
        }
    }
}

/// Folder layout. Subfolders are relative to `onedrive_folder` unless absolute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PathSettings {
    /// Defaults to `~/OneDrive`.
    pub onedrive_folder: Option<PathBuf>,
    pub data_subfolder: PathBuf,
    pub output_subfolder: PathBuf,
    pub catalogue_subfolder: PathBuf,
    pub local_output_dir: PathBuf,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            onedrive_folder: None,
            data_subfolder: PathBuf::from("Data"),
            output_subfolder: PathBuf::from("Processed"),
            catalogue_subfolder: PathBuf::from("Catalogue"),
            local_output_dir: PathBuf::from("data/output"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailySettings {
    pub allow_fallback: bool,
    /// Also write outputs to the OneDrive output folder.
    pub save_to_onedrive: bool,
    pub filename_suffix: String,
    /// Catalog file name inside the catalogue folder.
    pub catalog_file: String,
}

impl Default for DailySettings {
    fn default() -> Self {
        Self {
            allow_fallback: false,
            save_to_onedrive: true,
            filename_suffix: DEFAULT_FILENAME_SUFFIX.to_string(),
            catalog_file: "codeids.csv".to_string(),
        }
    }
}

/// Absolute folders derived from [`PathSettings`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedPaths {
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    pub catalogue_dir: PathBuf,
    pub local_output_dir: PathBuf,
    pub catalog_file: PathBuf,
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| WindlineError::io(path, e))?;
        let settings: Settings = toml::from_str(&text)?;
        debug!(path = %path.display(), "loaded settings");
        Ok(settings)
    }

    /// Apply overrides from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Apply overrides using `lookup` to read variables.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(v) = lookup("ONEDRIVE_FOLDER") {
            self.paths.onedrive_folder = Some(PathBuf::from(v));
        }
        if let Some(v) = lookup("DATA_SUBFOLDER") {
            self.paths.data_subfolder = PathBuf::from(v);
        }
        if let Some(v) = lookup("OUTPUT_SUBFOLDER") {
            self.paths.output_subfolder = PathBuf::from(v);
        }
        if let Some(v) = lookup("CATALOGUE_SUBFOLDER") {
            self.paths.catalogue_subfolder = PathBuf::from(v);
        }
        if let Some(v) = lookup("WINDLINE_SOURCE") {
            self.pipeline.source = v;
        }
        if let Some(v) = lookup("WINDLINE_TIMEZONE") {
            self.pipeline.timezone = v;
        }
    }

    /// The OneDrive root, falling back to `OneDrive` in the home folder.
    pub fn onedrive_folder(&self) -> Result<PathBuf> {
        if let Some(folder) = &self.paths.onedrive_folder {
            return Ok(folder.clone());
        }
        std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map(|home| PathBuf::from(home).join("OneDrive"))
            .ok_or_else(|| {
                WindlineError::Config("onedrive_folder unset and no home folder".to_string())
            })
    }

    /// Resolve every folder against the OneDrive root.
    pub fn resolve(&self) -> Result<ResolvedPaths> {
        let root = self.onedrive_folder()?;
        let under_root = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                root.join(p)
            }
        };
        let catalogue_dir = under_root(&self.paths.catalogue_subfolder);

        Ok(ResolvedPaths {
            data_dir: under_root(&self.paths.data_subfolder),
            output_dir: under_root(&self.paths.output_subfolder),
            catalog_file: catalogue_dir.join(&self.daily.catalog_file),
            catalogue_dir,
            local_output_dir: self.paths.local_output_dir.clone(),
        })
    }

    /// Pipeline configuration, with the timezone checked.
    pub fn pipeline_config(&self) -> Result<PipelineConfig> {
        let timezone: Tz = self.pipeline.timezone.parse().map_err(|e| {
            WindlineError::Config(format!("Unknown timezone '{}': {}", self.pipeline.timezone, e))
        })?;
        Ok(PipelineConfig {
            delimiter: self.pipeline.delimiter,
            columns: ColumnMap::new(&self.pipeline.timestamp_column, &self.pipeline.value_column),
            timezone,
            source: self.pipeline.source.clone(),
            messages: self.pipeline.messages,
        })
    }

    /// Daily run configuration for `date`.
    pub fn daily_config(&self, date: impl Into<String>) -> Result<DailyConfig> {
        let paths = self.resolve()?;
        Ok(DailyConfig {
            source_dir: paths.data_dir,
            local_output_dir: paths.local_output_dir,
            mirror_output_dir: self.daily.save_to_onedrive.then_some(paths.output_dir),
            date: date.into(),
            allow_fallback: self.daily.allow_fallback,
            filename_suffix: self.daily.filename_suffix.clone(),
            pipeline: self.pipeline_config()?,
            parser: ParserConfig::default(),
        })
    }
}
