//! Windline: normalization pipeline for wind sensor exports.
//!
//! Raw exports arrive as spreadsheets or delimited text with vendor column
//! names and local timestamps. Windline turns them into a canonical
//! `timestamp,value,status` table with UTC timestamps, optionally projects a
//! human-readable message per row, and writes `;`-separated CSV.
//!
//! # Stages
//!
//! - **Delimiter repair**: splits a table that was read as one fused column
//! - **Normalization**: renames, converts timestamps to UTC, derives status
//! - **Message projection**: adds `source` and `message` columns
//!
//! # Example
//!
//! ```no_run
//! use windline::{ParserConfig, Pipeline};
//!
//! let pipeline = Pipeline::new();
//! let output = pipeline
//!     .process_file("Mont Crosin_16-12-2025.xlsx", &ParserConfig::default())
//!     .unwrap();
//!
//! println!("Rows: {}", output.table.row_count());
//! println!("Hash: {}", output.source.hash);
//! ```

pub mod catalog;
pub mod config;
pub mod daily;
pub mod error;
pub mod input;
pub mod output;
pub mod quality;
pub mod table;
pub mod transform;

mod pipeline;

pub use crate::pipeline::{Pipeline, PipelineConfig, PipelineOutput};
pub use catalog::{Catalog, CatalogEntry, CoverageReport};
pub use config::Settings;
pub use daily::{DailyConfig, DailyRun, DailySummary, FileOutcome};
pub use error::{Result, WindlineError};
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use output::NotificationSink;
pub use quality::QualityReport;
pub use table::{Status, Table, Value};
pub use transform::{ColumnMap, Normalizer, normalize, project_messages, repair_delimiter};
