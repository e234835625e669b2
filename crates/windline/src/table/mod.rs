//! Tabular data model: tables, cell values and the canonical schema.

mod frame;
mod status;
mod value;

pub use frame::Table;
pub use status::{CANONICAL_COLUMNS, MESSAGE, SOURCE, STATUS, Status, TIMESTAMP, VALUE};
pub use value::Value;
