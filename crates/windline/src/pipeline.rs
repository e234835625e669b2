//! The normalization pipeline and its configuration.

use std::path::Path;

use chrono_tz::Tz;
use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;
use crate::input::{self, ParserConfig, SourceMetadata};
use crate::table::Table;
use crate::transform::{
    self, ColumnMap, DEFAULT_DELIMITER, DEFAULT_SOURCE, Normalizer, coerce::DEFAULT_TIMEZONE,
};

/// Configuration for a pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Delimiter a fused column is split on.
    pub delimiter: char,
    /// Source column names for the normalizer.
    pub columns: ColumnMap,
    /// Timezone naive timestamps are read in.
    pub timezone: Tz,
    /// Provenance tag written by message projection.
    pub source: String,
    /// Whether to append `source` and `message` columns.
    pub messages: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            delimiter: DEFAULT_DELIMITER,
            columns: ColumnMap::default(),
            timezone: DEFAULT_TIMEZONE,
            source: DEFAULT_SOURCE.to_string(),
            messages: false,
        }
    }
}

/// A normalized table together with where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineOutput {
    /// Metadata about the source file.
    pub source: SourceMetadata,
    /// The transformed table.
    pub table: Table,
}

/// Runs delimiter repair, normalization and (optionally) message
/// projection, in that order.
///
/// # Example
///
/// ```
/// use windline::{Pipeline, PipelineConfig, Table, Value};
///
/// let raw = Table::with_rows(
///     vec!["Datum / Uhrzeit;Wind Speed (avg)".to_string()],
///     vec![vec![Value::text("2025-11-23T23:10:00Z;8.72")]],
/// )
/// .unwrap();
///
/// let pipeline = Pipeline::with_config(PipelineConfig {
///     messages: true,
///     ..PipelineConfig::default()
/// });
/// let table = pipeline.run(&raw).unwrap();
///
/// assert_eq!(
///     table.get(0, "message"),
///     Some(&Value::text("Timestamp: 2025-11-23T23:10:00Z | Value: 8.72 | Status: 0"))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    normalizer: Normalizer,
}

impl Pipeline {
    /// Create a pipeline with default configuration.
    pub fn new() -> Self {
        Self::with_config(PipelineConfig::default())
    }

    /// Create a pipeline with custom configuration.
    pub fn with_config(config: PipelineConfig) -> Self {
        let normalizer = Normalizer::new(config.columns.clone()).with_timezone(config.timezone);
        Self { config, normalizer }
    }

    /// The active configuration.
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Transform a raw table.
    pub fn run(&self, table: &Table) -> Result<Table> {
        let repaired = if transform::needs_repair(table, self.config.delimiter) {
            debug!(column = %table.columns()[0], "fused column detected");
            transform::repair_delimiter(table, self.config.delimiter)?
        } else {
            table.clone()
        };

        let normalized = self.normalizer.normalize(&repaired)?;

        if self.config.messages {
            transform::project_messages(&normalized, &self.config.source)
        } else {
            Ok(normalized)
        }
    }

    /// Read a file through the ingestion boundary and transform it.
    pub fn process_file(&self, path: impl AsRef<Path>, parser: &ParserConfig) -> Result<PipelineOutput> {
        let (raw, source) = input::read_table(path, parser)?;
        let table = self.run(&raw)?;
        info!(file = %source.file, rows = table.row_count(), "processed file");
        Ok(PipelineOutput { source, table })
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
