//! Pure table transforms: delimiter repair, column normalization and
//! message projection.

pub mod coerce;
mod delimiter;
mod message;
mod normalize;

pub use delimiter::{DEFAULT_DELIMITER, needs_repair, repair_delimiter};
pub use message::{DEFAULT_SOURCE, format_message, project_messages};
pub use normalize::{
    ColumnMap, DEFAULT_TIMESTAMP_COLUMN, DEFAULT_VALUE_COLUMN, Normalizer, normalize,
};
